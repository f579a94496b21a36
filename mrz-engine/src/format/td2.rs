//! TD2 (2 x 36): smaller ID cards.

use super::{finish, parse_gender, split_name_field, ParsedFields};
use crate::{
    checksum::validate_check_digit,
    clean::{clean_alpha_field, clean_alpha_preserving_spaces, clean_alphanumeric_field},
    date::{parse_mrz_date, DateBias},
    types::{ChecksumReport, DocumentType, MrzRawLines, MrzRecord},
};

/// Parses 2 TD2 lines of 36 characters each.
#[must_use]
pub fn parse_td2(lines: &[String], current_yy: u32) -> Option<MrzRecord> {
    if lines.len() != 2 || lines.iter().any(|l| l.len() < 36) {
        return None;
    }
    let line1 = &lines[0];
    let line2 = &lines[1];

    let mut warnings = Vec::new();

    let doc_number = &line2[0..9];
    let doc_check = line2.chars().nth(9)?;
    if !validate_check_digit(doc_number, doc_check) {
        warnings.push("document number check digit failed".to_owned());
    }
    let id_number = clean_alphanumeric_field(doc_number);

    let nationality = clean_alpha_field(&line2[10..13]);

    let dob_raw = &line2[13..19];
    let dob_check = line2.chars().nth(19)?;
    if !validate_check_digit(dob_raw, dob_check) {
        warnings.push("date of birth check digit failed".to_owned());
    }
    let date_of_birth = parse_mrz_date(dob_raw, DateBias::Past, current_yy);

    let gender = parse_gender(line2.chars().nth(20)?);

    let expiry_raw = &line2[21..27];
    let expiry_check = line2.chars().nth(27)?;
    if !validate_check_digit(expiry_raw, expiry_check) {
        warnings.push("expiry date check digit failed".to_owned());
    }
    let expiry_date = parse_mrz_date(expiry_raw, DateBias::Future, current_yy);

    let (last_name, first_name) = split_name_field(&line1[5..36]);
    let last_name = clean_alpha_preserving_spaces(&last_name);
    let first_name = clean_alpha_preserving_spaces(&first_name);

    let checksum_report = ChecksumReport { warnings };
    let raw_lines = MrzRawLines { lines: lines.to_vec() };

    Some(finish(
        ParsedFields {
            first_name,
            last_name,
            id_number,
            date_of_birth,
            gender,
            expiry_date,
            nationality,
            checksum_report,
        },
        DocumentType::Td2,
        raw_lines,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn happy_path_lines() -> Vec<String> {
        vec![
            "I<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<".to_owned(),
            "D231458907UTO7408122F1204159<<<<<<<<".to_owned(),
        ]
    }

    #[test]
    fn td2_happy_path() {
        let record = parse_td2(&happy_path_lines(), 24).expect("parses");
        assert_eq!(record.document_type, DocumentType::Td2);
        assert_eq!(record.id_number, "D23145890");
        assert_eq!(record.date_of_birth, "1974-08-12");
        assert_eq!(record.expiry_date, "2012-04-15");
        assert_eq!(record.nationality, "UTO");
        assert_eq!(record.last_name, "ERIKSSON");
        assert_eq!(record.first_name, "ANNA MARIA");
        assert_eq!(record.checksum_report.failures(), 0);
    }

    #[test]
    fn td2_rejects_short_lines() {
        assert!(parse_td2(&["short".to_owned(); 2], 24).is_none());
    }
}
