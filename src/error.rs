//! Error taxonomy and retry mapping (C10).

use thiserror::Error;

/// Failure modes surfaced by the verification core, one category label per
/// variant (mirrors `biometric_pipeline::Error` and
/// `python_agent_interface::PyError`: one `thiserror` variant per failure
/// mode, never a generic catch-all).
#[derive(Error, Debug, Clone)]
pub enum ErrorKind {
    /// The camera collaborator denied stream access.
    #[error("camera permission denied")]
    CameraPermissionDenied,
    /// No camera device is available.
    #[error("no camera available")]
    NoCamera,
    /// `waitForVideoReady` exceeded its timeout.
    #[error("camera did not become ready in time")]
    VideoTimeout,
    /// A model failed to load; demoted rather than fatal (§7).
    #[error("model failed to load: {0}")]
    ModelLoadFailure(String),
    /// The OCR backend could not be reached.
    #[error("OCR backend missing or failed to initialize: {0}")]
    OcrBackendMissing(String),
    /// No OCR strategy reached the minimum character bar.
    #[error("MRZ unreadable")]
    MrzUnreadable,
    /// Cleaned text did not match any document layout.
    #[error("MRZ unparseable")]
    MrzUnparseable,
    /// Neither the accurate nor fast detector found a face on the document.
    #[error("no face found on document")]
    NoFaceOnDocument,
    /// A descriptor did not have the required 128-float length.
    #[error("face descriptor has invalid length")]
    DescriptorInvalid,
    /// The liveness challenge concluded with a negative verdict.
    #[error("liveness check failed: {reason}")]
    LivenessFailed {
        /// Human-readable reason (e.g. "static picture suspected").
        reason: String,
    },
    /// The static-attack heuristic fired.
    #[error("static attack suspected")]
    StaticAttackSuspected,
    /// The selfie descriptor did not match the stored portrait descriptor.
    #[error("face does not match document portrait (distance {distance:.3})")]
    FaceMismatch {
        /// Euclidean distance between the two descriptors.
        distance: f32,
    },
    /// A transient failure worth a plain retry, with its underlying cause.
    #[error("transient failure: {cause}")]
    Transient {
        /// Underlying cause, preserved for logs.
        cause: String,
    },
}

/// What the UI should offer the user after a recoverable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Re-capture the document's back (MRZ) side.
    RecaptureBack,
    /// Re-capture the document's front (portrait) side.
    RecaptureFront,
    /// Re-run the 3-pose liveness challenge.
    RerunLiveness,
    /// Nothing to retry at this phase; refresh the whole session.
    RestartSession,
}

impl ErrorKind {
    /// `true` for every kind except [`ErrorKind::ModelLoadFailure`], which is
    /// logged and demoted rather than surfaced as a phase failure (§7).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ErrorKind::ModelLoadFailure(_))
    }

    /// Maps an error to the retry action appropriate for the phase it
    /// occurred in, per the §7 retry-mapping table.
    #[must_use]
    pub fn retry_action(&self) -> RetryAction {
        match self {
            ErrorKind::MrzUnreadable | ErrorKind::MrzUnparseable => RetryAction::RecaptureBack,
            ErrorKind::NoFaceOnDocument | ErrorKind::DescriptorInvalid => {
                RetryAction::RecaptureFront
            }
            ErrorKind::LivenessFailed { .. }
            | ErrorKind::StaticAttackSuspected
            | ErrorKind::FaceMismatch { .. } => RetryAction::RerunLiveness,
            ErrorKind::CameraPermissionDenied
            | ErrorKind::NoCamera
            | ErrorKind::VideoTimeout
            | ErrorKind::ModelLoadFailure(_)
            | ErrorKind::OcrBackendMissing(_)
            | ErrorKind::Transient { .. } => RetryAction::RestartSession,
        }
    }
}
