//! TD1 (3 x 30): ID cards.

use super::{finish, parse_gender, split_name_field, ParsedFields};
use crate::{
    checksum::validate_check_digit,
    clean::{clean_alpha_field, clean_alpha_preserving_spaces, clean_alphanumeric_field},
    date::{parse_mrz_date, DateBias},
    types::{ChecksumReport, DocumentType, MrzRawLines, MrzRecord},
};

/// Parses 3 TD1 lines of 30 characters each. Returns `None` if any
/// positional slice can't be taken (lines shorter than 30 chars).
#[must_use]
pub fn parse_td1(lines: &[String], current_yy: u32) -> Option<MrzRecord> {
    if lines.len() != 3 || lines.iter().any(|l| l.len() < 30) {
        return None;
    }
    let line1 = &lines[0];
    let line2 = &lines[1];
    let line3 = &lines[2];

    let mut warnings = Vec::new();

    let doc_check = line1.chars().nth(14)?;
    let doc_number_9 = &line1[5..14];
    let doc_number_10 = &line1[5..15];
    let id_number = if validate_check_digit(doc_number_9, doc_check) {
        doc_number_9.to_owned()
    } else {
        warnings.push("document number check digit failed".to_owned());
        doc_number_10.to_owned()
    };
    let id_number = clean_alphanumeric_field(&id_number);

    let dob_raw = &line2[0..6];
    let dob_check = line2.chars().nth(6)?;
    if !validate_check_digit(dob_raw, dob_check) {
        warnings.push("date of birth check digit failed".to_owned());
    }
    let date_of_birth = parse_mrz_date(dob_raw, DateBias::Past, current_yy);

    let gender = parse_gender(line2.chars().nth(7)?);

    let expiry_raw = &line2[8..14];
    let expiry_check = line2.chars().nth(14)?;
    if !validate_check_digit(expiry_raw, expiry_check) {
        warnings.push("expiry date check digit failed".to_owned());
    }
    let expiry_date = parse_mrz_date(expiry_raw, DateBias::Future, current_yy);

    let nationality = clean_alpha_field(&line2[15..18]);

    let composite_field =
        format!("{}{}{}{}", &line1[5..30], &line2[0..7], &line2[8..15], &line2[18..29]);
    let composite_check = line2.chars().nth(29)?;
    if !validate_check_digit(&composite_field, composite_check) {
        warnings.push("composite check digit failed".to_owned());
    }

    let (last_name, first_name) = split_name_field(line3);
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
        DocumentType::Td1,
        raw_lines,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn happy_path_lines() -> Vec<String> {
        vec![
            "I<UTOD231458907<<<<<<<<<<<<<<<".to_owned(),
            "7408122F1204159UTO<<<<<<<<<<<6".to_owned(),
            "ERIKSSON<<ANNA<MARIA<<<<<<<<<<".to_owned(),
        ]
    }

    #[test]
    fn td1_happy_path() {
        let record = parse_td1(&happy_path_lines(), 24).expect("parses");
        assert_eq!(record.document_type, DocumentType::Td1);
        assert_eq!(record.id_number, "D23145890");
        assert_eq!(record.date_of_birth, "1974-08-12");
        assert_eq!(record.gender, 'F');
        assert_eq!(record.expiry_date, "2012-04-15");
        assert_eq!(record.nationality, "UTO");
        assert_eq!(record.last_name, "ERIKSSON");
        assert_eq!(record.first_name, "ANNA MARIA");
        assert_eq!(record.checksum_report.failures(), 0);
    }

    #[test]
    fn td1_rejects_short_lines() {
        assert!(parse_td1(&["short".to_owned(); 3], 24).is_none());
    }
}
