//! Self-contained ICAO 9303 MRZ extraction-and-parsing engine.
//!
//! Pulled out of the main verification pipeline the way the teacher pulls
//! its fraud-detection heuristics into their own crate: the hardest,
//! densest algorithmic surface, unit-testable in isolation from cameras,
//! face models, and the phase controller.

pub mod checksum;
pub mod clean;
pub mod date;
pub mod error;
pub mod format;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod quality;
pub mod types;

pub use error::MrzError;
pub use ocr::{OcrBackend, TesseractOcr};
pub use pipeline::extract_mrz;
pub use types::{ChecksumReport, DocumentType, MrzQuality, MrzRawLines, MrzRecord, QualityBand};
