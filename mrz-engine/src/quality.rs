//! MRZ quality scoring (0-100).

use crate::types::{ChecksumReport, DocumentType, MrzQuality, MrzRawLines, QualityBand};

/// Inputs needed to score a parsed MRZ record.
pub struct ScoreInput<'a> {
    /// The cleaned, padded lines the record was parsed from.
    pub raw_lines: &'a MrzRawLines,
    /// Detected document format.
    pub document_type: DocumentType,
    /// Parsed given name(s).
    pub first_name: &'a str,
    /// Parsed surname.
    pub last_name: &'a str,
    /// Parsed document number.
    pub id_number: &'a str,
    /// Parsed date of birth (ISO or `"UNKNOWN"`).
    pub date_of_birth: &'a str,
    /// Accumulated checksum warnings.
    pub checksum_report: &'a ChecksumReport,
}

fn length_score(input: &ScoreInput) -> (u8, Option<String>) {
    let expected = input.document_type.expected_text_length();
    let actual = input.raw_lines.char_len();
    let diff = actual.abs_diff(expected);
    match diff {
        0 => (20, None),
        1..=5 => (15, None),
        6..=10 => (10, Some(format!("MRZ length differs from expected by {diff} characters"))),
        _ => (0, Some(format!("MRZ length differs from expected by {diff} characters"))),
    }
}

fn checksum_score(report: &ChecksumReport) -> (u8, Option<String>) {
    match report.failures() {
        0 => (30, None),
        1 => (20, Some("1 checksum failed".to_owned())),
        2 => (10, Some("2 checksums failed".to_owned())),
        n => (0, Some(format!("{n} checksums failed"))),
    }
}

fn completeness_score(input: &ScoreInput) -> (u8, Option<String>) {
    let missing = [
        input.first_name.is_empty(),
        input.last_name.is_empty(),
        input.id_number.is_empty(),
        input.date_of_birth == crate::types::UNKNOWN_DATE,
    ]
    .into_iter()
    .filter(|b| *b)
    .count();
    match missing {
        0 => (30, None),
        1 => (20, Some("1 identity field missing".to_owned())),
        _ => (10, Some(format!("{missing} identity fields missing"))),
    }
}

fn plausibility_score(input: &ScoreInput) -> (u8, Option<String>) {
    let names_have_digits =
        input.first_name.chars().any(|c| c.is_ascii_digit()) || input.last_name.chars().any(|c| c.is_ascii_digit());
    let id_has_letters = input.id_number.chars().any(|c| c.is_ascii_alphabetic());
    match (names_have_digits, id_has_letters) {
        (false, false) => (20, None),
        (true, true) => (0, Some("names contain digits and id contains letters".to_owned())),
        (true, false) => (10, Some("names contain digits".to_owned())),
        (false, true) => (10, Some("id number contains letters".to_owned())),
    }
}

/// Computes the composite 0-100 quality score and its band.
#[must_use]
pub fn score(input: ScoreInput) -> MrzQuality {
    let mut issues = Vec::new();
    let mut total: u32 = 0;

    for (points, issue) in
        [length_score(&input), checksum_score(input.checksum_report), completeness_score(&input), plausibility_score(&input)]
    {
        total += u32::from(points);
        if let Some(issue) = issue {
            issues.push(issue);
        }
    }

    let score = u8::try_from(total.min(100)).unwrap_or(100);
    let band = if score >= 80 {
        QualityBand::High
    } else if score >= 60 {
        QualityBand::Medium
    } else {
        QualityBand::Low
    };

    MrzQuality { score, band, issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChecksumReport;

    fn perfect_input<'a>(raw_lines: &'a MrzRawLines) -> ScoreInput<'a> {
        ScoreInput {
            raw_lines,
            document_type: DocumentType::Td1,
            first_name: "ANNA MARIA",
            last_name: "ERIKSSON",
            // Purely numeric, so the plausibility score doesn't dock points
            // for "id contains letters" (real document numbers like
            // "D23145890" legitimately do, and are scored at 10, not 20 —
            // see `id_with_letters_loses_plausibility_points` below).
            id_number: "231458907",
            date_of_birth: "1974-08-12",
            checksum_report: &ChecksumReport::default(),
        }
    }

    #[test]
    fn perfect_record_scores_high() {
        let lines = MrzRawLines { lines: vec!["x".repeat(30), "x".repeat(30), "x".repeat(30)] };
        let quality = score(perfect_input(&lines));
        assert_eq!(quality.score, 100);
        assert!(matches!(quality.band, QualityBand::High));
        assert!(quality.issues.is_empty());
    }

    #[test]
    fn id_with_letters_loses_plausibility_points() {
        let lines = MrzRawLines { lines: vec!["x".repeat(30), "x".repeat(30), "x".repeat(30)] };
        let mut input = perfect_input(&lines);
        input.id_number = "D23145890";
        let quality = score(input);
        assert_eq!(quality.score, 90);
        assert_eq!(quality.issues, vec!["id number contains letters".to_owned()]);
    }

    #[test]
    fn missing_fields_and_checksum_failures_lower_band() {
        let lines = MrzRawLines { lines: vec!["x".repeat(10)] };
        let report = ChecksumReport { warnings: vec!["a".into(), "b".into(), "c".into()] };
        let input = ScoreInput {
            raw_lines: &lines,
            document_type: DocumentType::Td1,
            first_name: "",
            last_name: "ERIKSSON",
            id_number: "D23145890",
            date_of_birth: "UNKNOWN",
            checksum_report: &report,
        };
        let quality = score(input);
        assert!(matches!(quality.band, QualityBand::Low));
        assert!(!quality.issues.is_empty());
    }
}
