//! Phase controller (C8): the 4-state linear machine gating MRZ -> portrait
//! -> liveness -> review -> submitted, mirroring the teacher's
//! `OrbPlan`/`BrokerFlow` pattern of explicit transition results driving a
//! cooperative loop, without the hardware broker this core has no need for.

use mrz_engine::MrzRecord;

use crate::{
    attestation,
    collaborators::{CameraCollaborator, Facing, FaceDetectorCollaborator},
    error::ErrorKind,
    face,
    face::matcher,
    liveness::LivenessChallenge,
    types::{Attestation, LivenessResult, MatchResult, Portrait},
};

/// The controller's current stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Awaiting a parsed `MrzRecord` from the document's back.
    AwaitMrz,
    /// Awaiting a portrait descriptor from the document's front.
    AwaitPortrait,
    /// Awaiting a passing liveness + match verdict from the selfie capture.
    AwaitLiveness,
    /// All evidence collected; awaiting user confirmation.
    Review,
    /// Terminal: the attestation has been emitted.
    Submitted,
}

impl Phase {
    fn index(self) -> usize {
        match self {
            Phase::AwaitMrz => 0,
            Phase::AwaitPortrait => 1,
            Phase::AwaitLiveness => 2,
            Phase::Review => 3,
            Phase::Submitted => 4,
        }
    }
}

/// Accumulated evidence and current stage of one verification session.
pub struct PhaseController {
    phase: Phase,
    mrz: Option<MrzRecord>,
    portrait: Option<Portrait>,
    liveness: Option<LivenessResult>,
    match_result: Option<MatchResult>,
}

impl Default for PhaseController {
    fn default() -> Self {
        Self {
            phase: Phase::AwaitMrz,
            mrz: None,
            portrait: None,
            liveness: None,
            match_result: None,
        }
    }
}

impl PhaseController {
    /// Starts a new session at `AwaitMrz`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The controller's current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Records phase 1's result. Requires `mrz.id_number` to be non-empty
    /// to advance.
    pub fn submit_mrz(&mut self, mrz: MrzRecord) -> Result<(), ErrorKind> {
        if mrz.id_number.is_empty() {
            return Err(ErrorKind::MrzUnparseable);
        }
        self.mrz = Some(mrz);
        self.phase = Phase::AwaitPortrait;
        Ok(())
    }

    /// Runs portrait extraction against the document's front frame and, if
    /// the descriptor is valid, advances to `AwaitLiveness`.
    pub fn submit_front_frame(
        &mut self,
        camera: &mut dyn CameraCollaborator,
        detector: &dyn FaceDetectorCollaborator,
    ) -> Result<(), ErrorKind> {
        let stream = camera.acquire(Facing::Environment, (1280, 720))?;
        let frame = camera.current_frame(stream)?;
        let portrait = face::extract_portrait(detector, &frame);
        camera.release(stream);
        let portrait = portrait?;

        if !portrait.descriptor_valid() {
            return Err(ErrorKind::DescriptorInvalid);
        }
        self.portrait = Some(portrait);
        self.phase = Phase::AwaitLiveness;
        Ok(())
    }

    /// Runs the 3-pose liveness challenge and the face match against the
    /// stored portrait descriptor. Advances to `Review` only if both the
    /// match and the liveness verdict are positive.
    pub async fn run_liveness(
        &mut self,
        camera: &mut dyn CameraCollaborator,
        detector: &dyn FaceDetectorCollaborator,
    ) -> Result<(), ErrorKind> {
        let portrait = self.portrait.as_ref().ok_or(ErrorKind::DescriptorInvalid)?;

        let challenge = LivenessChallenge::new();
        let (liveness, selfie_descriptor) = challenge.run(camera, detector).await?;

        let selfie_descriptor = selfie_descriptor.ok_or(ErrorKind::NoFaceOnDocument)?;
        let match_result = matcher::match_descriptors(&portrait.descriptor, &selfie_descriptor)?;

        self.liveness = Some(liveness.clone());
        self.match_result = Some(match_result.clone());

        if !match_result.is_match {
            return Err(ErrorKind::FaceMismatch { distance: match_result.distance });
        }
        if !liveness.is_live {
            return Err(ErrorKind::LivenessFailed { reason: liveness.reason });
        }

        self.phase = Phase::Review;
        Ok(())
    }

    /// Assembles and returns the final attestation, moving to `Submitted`.
    pub fn submit(&mut self) -> Result<Attestation, ErrorKind> {
        if self.phase != Phase::Review {
            return Err(ErrorKind::Transient { cause: "submit called outside Review phase".to_owned() });
        }
        let mrz = self.mrz.as_ref().ok_or(ErrorKind::MrzUnparseable)?;
        let liveness = self.liveness.as_ref().ok_or(ErrorKind::DescriptorInvalid)?;
        let match_result = self.match_result.as_ref().ok_or(ErrorKind::DescriptorInvalid)?;

        let attestation = attestation::assemble(mrz, liveness, match_result);
        self.phase = Phase::Submitted;
        Ok(attestation)
    }

    /// Moves backward to an earlier phase, always permitted, clearing the
    /// in-flight result area for every phase at or after `target`.
    pub fn go_back(&mut self, target: Phase) {
        if target.index() >= self.phase.index() {
            return;
        }
        if target.index() <= Phase::AwaitMrz.index() {
            self.mrz = None;
        }
        if target.index() <= Phase::AwaitPortrait.index() {
            self.portrait = None;
        }
        if target.index() <= Phase::AwaitLiveness.index() {
            self.liveness = None;
            self.match_result = None;
        }
        self.phase = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrz_engine::{ChecksumReport, DocumentType, MrzQuality, MrzRawLines, QualityBand};

    fn sample_mrz() -> MrzRecord {
        MrzRecord {
            first_name: "ANNA MARIA".to_owned(),
            last_name: "ERIKSSON".to_owned(),
            id_number: "D23145890".to_owned(),
            date_of_birth: "1974-08-12".to_owned(),
            gender: 'F',
            expiry_date: "2012-04-15".to_owned(),
            nationality: "UTO".to_owned(),
            document_type: DocumentType::Td1,
            raw_lines: MrzRawLines { lines: vec![] },
            quality: MrzQuality { score: 100, band: QualityBand::High, issues: vec![] },
            checksum_report: ChecksumReport::default(),
        }
    }

    #[test]
    fn rejects_mrz_with_empty_id_number() {
        let mut mrz = sample_mrz();
        mrz.id_number = String::new();
        let mut controller = PhaseController::new();
        assert!(controller.submit_mrz(mrz).is_err());
        assert_eq!(controller.phase(), Phase::AwaitMrz);
    }

    #[test]
    fn advances_past_mrz_on_valid_record() {
        let mut controller = PhaseController::new();
        controller.submit_mrz(sample_mrz()).expect("valid record advances");
        assert_eq!(controller.phase(), Phase::AwaitPortrait);
    }

    #[test]
    fn going_back_clears_downstream_evidence() {
        let mut controller = PhaseController::new();
        controller.submit_mrz(sample_mrz()).expect("valid record advances");
        controller.go_back(Phase::AwaitMrz);
        assert_eq!(controller.phase(), Phase::AwaitMrz);
        assert!(controller.mrz.is_none());
    }
}
