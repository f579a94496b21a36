//! MRZ data model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ICAO 9303 document format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DocumentType {
    /// 3 lines x 30 chars (ID cards).
    Td1,
    /// 2 lines x 36 chars (smaller ID cards).
    Td2,
    /// 2 lines x 44 chars (passports).
    Td3,
}

impl DocumentType {
    /// Number of MRZ lines for this format.
    #[must_use]
    pub fn line_count(self) -> usize {
        match self {
            DocumentType::Td1 => 3,
            DocumentType::Td2 | DocumentType::Td3 => 2,
        }
    }

    /// Canonical line length for this format.
    #[must_use]
    pub fn line_length(self) -> usize {
        match self {
            DocumentType::Td1 => 30,
            DocumentType::Td2 => 36,
            DocumentType::Td3 => 44,
        }
    }

    /// Expected cleaned-text length used by the quality score.
    #[must_use]
    pub fn expected_text_length(self) -> usize {
        match self {
            DocumentType::Td1 => 90,
            DocumentType::Td2 => 72,
            DocumentType::Td3 => 88,
        }
    }
}

/// An ordered sequence of 2 or 3 uppercase MRZ lines, each padded to the
/// canonical length of its format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MrzRawLines {
    /// Raw, cleaned, padded lines, in document order.
    pub lines: Vec<String>,
}

impl MrzRawLines {
    /// Joins the lines with newlines, the canonical cleaned-text form.
    #[must_use]
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }

    /// Total character count across all lines (used by quality scoring).
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.lines.iter().map(String::len).sum()
    }
}

/// One failed checksum, reported as a human-readable warning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChecksumReport {
    /// One warning per failed check digit.
    pub warnings: Vec<String>,
}

impl ChecksumReport {
    /// Number of failed checks.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.warnings.len()
    }
}

/// Quality band derived from the 0-100 quality score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum QualityBand {
    /// Score < 60.
    Low,
    /// 60 <= score < 80.
    Medium,
    /// score >= 80.
    High,
}

/// MRZ quality assessment.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct MrzQuality {
    /// 0-100 composite score.
    pub score: u8,
    /// Band derived from `score`.
    pub band: QualityBand,
    /// Human-readable issues contributing to a lowered score.
    pub issues: Vec<String>,
}

/// A fully parsed MRZ record.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct MrzRecord {
    /// Given name(s).
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Document / passport number.
    pub id_number: String,
    /// ISO `YYYY-MM-DD`, or `"UNKNOWN"` if unparseable.
    pub date_of_birth: String,
    /// `M`, `F`, or `X`.
    pub gender: char,
    /// ISO `YYYY-MM-DD`, or `"UNKNOWN"` if unparseable.
    pub expiry_date: String,
    /// 3-letter nationality code.
    pub nationality: String,
    /// Detected document format.
    pub document_type: DocumentType,
    /// The raw, cleaned lines this record was parsed from.
    pub raw_lines: MrzRawLines,
    /// Quality assessment of the OCR + parse.
    pub quality: MrzQuality,
    /// Checksum validation results.
    pub checksum_report: ChecksumReport,
}

/// Value the spec reserves for unparseable dates.
pub const UNKNOWN_DATE: &str = "UNKNOWN";
