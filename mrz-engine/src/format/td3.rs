//! TD3 (2 x 44): passports.

use super::{finish, parse_gender, split_name_field, ParsedFields};
use crate::{
    checksum::validate_check_digit,
    clean::{clean_alpha_field, clean_alpha_preserving_spaces, clean_alphanumeric_field},
    date::{parse_mrz_date, DateBias},
    types::{ChecksumReport, DocumentType, MrzRawLines, MrzRecord},
};

/// Parses 2 TD3 lines of 44 characters each (passports). The `P<` prefix on
/// line 1 is not asserted; malformed prefixes are accepted silently.
#[must_use]
pub fn parse_td3(lines: &[String], current_yy: u32) -> Option<MrzRecord> {
    if lines.len() != 2 || lines.iter().any(|l| l.len() < 44) {
        return None;
    }
    let line1 = &lines[0];
    let line2 = &lines[1];

    let mut warnings = Vec::new();

    let passport_number = &line2[0..9];
    let passport_check = line2.chars().nth(9)?;
    if !validate_check_digit(passport_number, passport_check) {
        warnings.push("passport number check digit failed".to_owned());
    }
    let id_number = clean_alphanumeric_field(passport_number);

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

    // ICAO 9303 part 4 composite: passport#+check, DOB+check, expiry+check,
    // personal number field (14 chars) + its own check digit.
    let composite_field =
        format!("{}{}{}{}", &line2[0..10], &line2[13..20], &line2[21..28], &line2[28..43]);
    let composite_check = line2.chars().nth(43)?;
    if !validate_check_digit(&composite_field, composite_check) {
        warnings.push("composite check digit failed".to_owned());
    }

    let (last_name, first_name) = split_name_field(&line1[5..44]);
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
        DocumentType::Td3,
        raw_lines,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn happy_path_lines() -> Vec<String> {
        vec![
            "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<".to_owned(),
            "L898902C36UTO7408122F1204159ZE184226B<<<<<10".to_owned(),
        ]
    }

    #[test]
    fn td3_happy_path() {
        let record = parse_td3(&happy_path_lines(), 24).expect("parses");
        assert_eq!(record.document_type, DocumentType::Td3);
        assert_eq!(record.id_number, "L898902C3");
        assert_eq!(record.date_of_birth, "1974-08-12");
        assert_eq!(record.expiry_date, "2012-04-15");
        assert_eq!(record.nationality, "UTO");
        assert_eq!(record.last_name, "ERIKSSON");
        assert_eq!(record.first_name, "ANNA MARIA");
    }

    #[test]
    fn td3_rejects_short_lines() {
        assert!(parse_td3(&["short".to_owned(); 2], 24).is_none());
    }
}
