//! MRZ engine error taxonomy.

use thiserror::Error;

/// Failure modes of the MRZ extraction-and-parsing engine.
#[derive(Error, Debug, Clone)]
pub enum MrzError {
    /// No OCR strategy produced enough cleaned text to attempt a parse.
    #[error("MRZ unreadable: no OCR strategy reached the minimum character bar")]
    MrzUnreadable,
    /// Cleaned text was long enough, but no document format parsed it.
    #[error("MRZ unparseable: text did not match TD1, TD2, or TD3 layout")]
    MrzUnparseable,
    /// The configured OCR backend could not be reached at all.
    #[error("OCR backend missing or failed to initialize: {0}")]
    OcrBackendMissing(String),
}
