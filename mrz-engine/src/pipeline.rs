//! Top-level MRZ extraction pipeline: three capture-region strategies, each
//! OCR'd and cleaned, the best result handed to format detection.

use opencv::{
    core::{Mat, Rect},
    prelude::*,
};

use crate::{
    clean::{clean_mrz_text, split_fixed_width, Cleaned},
    error::MrzError,
    format::{parse_td1, parse_td2, parse_td3},
    ocr::{run_two_pass, OcrBackend},
    preprocess::preprocess,
    types::{DocumentType, MrzRecord},
};

/// Fraction down the frame where the MRZ band is assumed to start, when
/// cropping the bottom strip of a full document frame.
pub const CROP_START: f64 = 0.65;
/// A cleaned strategy result at or above this length is accepted outright,
/// skipping the remaining strategies.
pub const STRONG_BAR: usize = 60;
/// Below this length even the best strategy is considered unreadable.
pub const WEAK_BAR: usize = 30;

/// One way of presenting a frame to OCR.
enum Strategy {
    /// The untouched, full camera frame.
    FullFrame,
    /// The bottom `1 - CROP_START` of the frame, uncropped otherwise.
    BottomCrop,
    /// The bottom crop, run through the C1 preprocessor.
    PreprocessedCrop,
}

fn bottom_crop(frame: &Mat) -> opencv::Result<Mat> {
    let height = frame.rows();
    let width = frame.cols();
    let y = (f64::from(height) * CROP_START).round() as i32;
    let roi = Rect::new(0, y, width, height - y);
    Ok(Mat::roi(frame, roi)?.clone())
}

fn frame_for(strategy: &Strategy, frame: &Mat) -> opencv::Result<Mat> {
    match strategy {
        Strategy::FullFrame => Ok(frame.clone()),
        Strategy::BottomCrop => bottom_crop(frame),
        Strategy::PreprocessedCrop => preprocess(&bottom_crop(frame)?),
    }
}

/// Runs OCR across the three capture-region strategies, returning the
/// cleaned text that best satisfies the strong/weak bars described in the
/// module docs, or [`MrzError::MrzUnreadable`] if none clears `WEAK_BAR`.
pub fn extract_text(backend: &dyn OcrBackend, frame: &Mat) -> Result<Cleaned, MrzError> {
    let strategies = [Strategy::FullFrame, Strategy::BottomCrop, Strategy::PreprocessedCrop];

    let mut best: Option<Cleaned> = None;
    for strategy in &strategies {
        let Ok(region) = frame_for(strategy, frame) else { continue };
        let Ok(ocr) = run_two_pass(backend, &region) else { continue };
        let cleaned = clean_mrz_text(&ocr.text);

        if cleaned.len() >= STRONG_BAR {
            return Ok(cleaned);
        }
        if best.as_ref().map_or(true, |b| cleaned.len() > b.len()) {
            best = Some(cleaned);
        }
    }

    match best {
        Some(cleaned) if cleaned.len() >= WEAK_BAR => Ok(cleaned),
        _ => Err(MrzError::MrzUnreadable),
    }
}

/// Attempts TD1, then TD3, then TD2 parsing against `cleaned`, in that
/// order, recovering fixed-width lines from a collapsed block when natural
/// line breaks didn't survive cleaning.
fn parse_any(cleaned: &Cleaned, current_yy: u32) -> Option<MrzRecord> {
    let attempts: Vec<Vec<String>> = match cleaned {
        Cleaned::Lines(lines) => vec![lines.clone()],
        Cleaned::Block(block) => vec![
            split_fixed_width(block, DocumentType::Td1.line_count(), DocumentType::Td1.line_length()),
            split_fixed_width(block, DocumentType::Td3.line_count(), DocumentType::Td3.line_length()),
            split_fixed_width(block, DocumentType::Td2.line_count(), DocumentType::Td2.line_length()),
        ],
    };

    for lines in &attempts {
        if lines.len() == 3 {
            if let Some(record) = parse_td1(lines, current_yy) {
                return Some(record);
            }
        }
        if lines.len() == 2 {
            if let Some(record) = parse_td3(lines, current_yy) {
                return Some(record);
            }
            if let Some(record) = parse_td2(lines, current_yy) {
                return Some(record);
            }
        }
    }
    None
}

/// Runs the full C1+C2+C3 pipeline on a single camera frame: OCR extraction
/// across three strategies, cleaning, and positional parsing in TD1 -> TD3
/// -> TD2 order. `current_yy` is the caller-supplied current 2-digit year
/// used for century-pivot date expansion.
pub fn extract_mrz(backend: &dyn OcrBackend, frame: &Mat, current_yy: u32) -> Result<MrzRecord, MrzError> {
    let cleaned = extract_text(backend, frame)?;
    parse_any(&cleaned, current_yy).ok_or(MrzError::MrzUnparseable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrOptions, OcrResult};

    struct FixedOcr(&'static str);

    impl OcrBackend for FixedOcr {
        fn recognize(&self, _frame: &Mat, _options: &OcrOptions) -> Result<OcrResult, MrzError> {
            Ok(OcrResult { text: self.0.to_owned(), confidence: None })
        }
    }

    struct FailingOcr;

    impl OcrBackend for FailingOcr {
        fn recognize(&self, _frame: &Mat, _options: &OcrOptions) -> Result<OcrResult, MrzError> {
            Err(MrzError::OcrBackendMissing("no backend in test".to_owned()))
        }
    }

    #[test]
    fn unreadable_when_every_strategy_errors() {
        let frame = Mat::default();
        let err = extract_mrz(&FailingOcr, &frame, 24).unwrap_err();
        assert!(matches!(err, MrzError::MrzUnreadable));
    }

    #[test]
    fn parses_td3_from_clean_two_line_text() {
        let text = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<\nL898902C36UTO7408122F1204159ZE184226B<<<<<10";
        let backend = FixedOcr(text);
        let frame = Mat::default();
        let record = extract_mrz(&backend, &frame, 24).expect("parses");
        assert_eq!(record.document_type, DocumentType::Td3);
        assert_eq!(record.id_number, "L898902C3");
    }
}
