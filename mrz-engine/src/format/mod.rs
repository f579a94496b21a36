//! Per-format ICAO 9303 positional parsers.

mod td1;
mod td2;
mod td3;

pub use td1::parse_td1;
pub use td2::parse_td2;
pub use td3::parse_td3;

use crate::types::{ChecksumReport, MrzRecord};

/// A parser's raw field extraction before quality scoring is applied, plus
/// the checksum report accumulated while parsing.
pub(crate) struct ParsedFields {
    pub first_name: String,
    pub last_name: String,
    pub id_number: String,
    pub date_of_birth: String,
    pub gender: char,
    pub expiry_date: String,
    pub nationality: String,
    pub checksum_report: ChecksumReport,
}

/// Splits an ICAO name field (`SURNAME<<GIVEN<NAMES<<<...`) into
/// `(last_name, first_name)`, collapsing filler runs to single spaces and
/// trimming the result.
pub(crate) fn split_name_field(field: &str) -> (String, String) {
    let mut parts = field.splitn(2, "<<");
    let surname = parts.next().unwrap_or_default();
    let given = parts.next().unwrap_or_default();
    (clean_name_component(surname), clean_name_component(given))
}

fn clean_name_component(component: &str) -> String {
    component.split('<').filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Parses a gender code character, per ICAO 9303, defaulting to `X` for
/// anything other than `M`/`F`.
pub(crate) fn parse_gender(c: char) -> char {
    match c {
        'M' | 'F' => c,
        _ => 'X',
    }
}

pub(crate) fn finish(
    fields: ParsedFields,
    document_type: crate::types::DocumentType,
    raw_lines: crate::types::MrzRawLines,
) -> MrzRecord {
    let quality = crate::quality::score(crate::quality::ScoreInput {
        raw_lines: &raw_lines,
        document_type,
        first_name: &fields.first_name,
        last_name: &fields.last_name,
        id_number: &fields.id_number,
        date_of_birth: &fields.date_of_birth,
        checksum_report: &fields.checksum_report,
    });
    MrzRecord {
        first_name: fields.first_name,
        last_name: fields.last_name,
        id_number: fields.id_number,
        date_of_birth: fields.date_of_birth,
        gender: fields.gender,
        expiry_date: fields.expiry_date,
        nationality: fields.nationality,
        document_type,
        raw_lines,
        quality,
        checksum_report: fields.checksum_report,
    }
}
