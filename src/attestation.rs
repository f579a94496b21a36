//! Attestation assembler (C9): merges MRZ identity, document type, and the
//! biometric verdict into the final record.

use std::time::{SystemTime, UNIX_EPOCH};

use mrz_engine::{DocumentType, MrzRecord};

use crate::types::{Attestation, BiometricSummary, LivenessResult, MatchResult};

fn document_type_label(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::Td1 => "TD1",
        DocumentType::Td2 => "TD2",
        DocumentType::Td3 => "TD3",
    }
}

fn verification_status(liveness: &LivenessResult, match_result: &MatchResult) -> String {
    if liveness.is_live && match_result.is_match {
        "verified".to_owned()
    } else {
        "failed".to_owned()
    }
}

/// Builds the final [`Attestation`] from phase 1's MRZ record and phase 3's
/// liveness/match results. Callers only reach this once the phase
/// controller has gated all three as present and valid (§4.1).
#[must_use]
pub fn assemble(mrz: &MrzRecord, liveness: &LivenessResult, match_result: &MatchResult) -> Attestation {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    Attestation {
        first_name: mrz.first_name.clone(),
        last_name: mrz.last_name.clone(),
        id_number: mrz.id_number.clone(),
        date_of_birth: mrz.date_of_birth.clone(),
        gender: mrz.gender,
        expiry_date: mrz.expiry_date.clone(),
        nationality: mrz.nationality.clone(),
        document_type: document_type_label(mrz.document_type).to_owned(),
        biometrics: BiometricSummary {
            match_score: match_result.similarity,
            is_live: liveness.is_live,
            liveness_score: liveness.score,
            verification_status: verification_status(liveness, match_result),
        },
        timestamp_ms,
    }
}
