//! External interfaces (§6): the collaborator traits the core is driven
//! through, and the typed events it emits. A headless test harness supplies
//! mock implementations of these traits directly (§9, "Camera collaborator
//! as an interface").

use crate::{
    error::ErrorKind,
    types::{Attestation, Frame},
};

/// Which physical camera a stream should face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    /// Front-facing camera, used for the selfie/liveness challenge.
    User,
    /// Back-facing (environment) camera, used for the document capture.
    Environment,
}

/// An opaque handle to an acquired camera stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamId(pub u64);

/// Camera acquisition surface. Never touched directly by the core's
/// algorithmic modules — only by the phase controller.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait CameraCollaborator {
    /// Acquires a stream facing `facing`, at `preferred_resolution`
    /// `(width, height)`.
    fn acquire(
        &mut self,
        facing: Facing,
        preferred_resolution: (u32, u32),
    ) -> Result<StreamId, ErrorKind>;

    /// Releases a previously acquired stream.
    fn release(&mut self, stream: StreamId);

    /// Returns the most recent frame from `stream`.
    fn current_frame(&self, stream: StreamId) -> Result<Frame, ErrorKind>;
}

/// Image-ops backend (C1's native operations). The core must degrade
/// gracefully to the raw frame if this backend is missing (§6).
pub trait ImageOpsCollaborator {
    /// Runs the full preprocessing pipeline on `frame`, or returns `None` if
    /// the backend is unavailable.
    fn preprocess(&self, frame: &Frame) -> Option<Frame>;
}

/// Face-detection collaborator (C4/C6): detects a single face and its
/// biometric evidence.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait FaceDetectorCollaborator {
    /// Runs the high-accuracy detector at the given minimum confidence.
    fn detect_accurate(&self, frame: &Frame, min_confidence: f32) -> Option<Detection>;

    /// Runs the fast detector at a fixed input size, as a fallback.
    fn detect_fast(&self, frame: &Frame, input_size: u32, score_threshold: f32) -> Option<Detection>;
}

/// One face detector output: bounding box, landmarks, and descriptor.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Bounding box, `(x, y, width, height)`, in pixels.
    pub bbox: (i32, i32, i32, i32),
    /// 68-point facial landmarks, in pixels.
    pub landmarks68: Vec<(f32, f32)>,
    /// 128-dim descriptor.
    pub descriptor: Vec<f32>,
    /// Detector confidence, 0..1.
    pub confidence: f32,
}

/// Typed events the core emits in place of the source's `data-action`
/// string dispatch (§9, "Typed events over string actions"). The UI never
/// reads core internals — it only reacts to these.
#[derive(Clone, Debug)]
pub enum VerificationEvent {
    /// The controller entered phase `n` (0-indexed: MRZ, Portrait,
    /// Liveness, Review).
    PhaseEntered(usize),
    /// Progress within the current phase: a label and a 0..100 percentage.
    Progress(String, u8),
    /// The current phase completed successfully.
    PhaseSucceeded(usize),
    /// The current phase failed.
    PhaseFailed(usize, ErrorKind),
    /// The pipeline reached `SUBMITTED` with a finished attestation.
    Submitted(Attestation),
}
