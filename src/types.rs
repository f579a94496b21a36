//! Core data model: frames, poses, biometric results, attestation (§3).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A raw bitmap with 8-bit RGBA pixels, produced by the camera collaborator
/// on demand. Transient: never persisted past the phase that captured it.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Packed RGBA pixel data, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Builds a frame, trusting the caller that `rgba.len() == width *
    /// height * 4`.
    #[must_use]
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self { width, height, rgba }
    }
}

/// Length every stored biometric descriptor must have.
pub const DESCRIPTOR_LEN: usize = 128;

/// A face detection's portrait crop and descriptor, extracted once per
/// document/selfie frame (C4).
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Portrait {
    /// Cropped face region, padded 20px on every side.
    pub crop: Frame,
    /// 128-dim face descriptor. Invariant: `descriptor.len() == 128`.
    pub descriptor: Vec<f32>,
}

impl Portrait {
    /// `true` if the descriptor satisfies [`DESCRIPTOR_LEN`].
    #[must_use]
    pub fn descriptor_valid(&self) -> bool {
        self.descriptor.len() == DESCRIPTOR_LEN
    }
}

/// One of the three poses requested during the liveness challenge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Pose {
    /// Target yaw 0°.
    Front,
    /// Target yaw −20°.
    Left,
    /// Target yaw +20°.
    Right,
}

impl Pose {
    /// Fixed challenge order: FRONT, LEFT, RIGHT.
    pub const ORDER: [Pose; 3] = [Pose::Front, Pose::Left, Pose::Right];

    /// Target yaw, in degrees, for this pose.
    #[must_use]
    pub fn target_yaw_deg(self) -> f32 {
        match self {
            Pose::Front => 0.0,
            Pose::Left => -20.0,
            Pose::Right => 20.0,
        }
    }
}

/// Geometric analysis of a single captured pose frame (C6), or the reason
/// detection failed.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct PoseAnalysis {
    /// Which pose this analysis belongs to.
    pub pose: Pose,
    /// Whether exactly one face was detected.
    pub detected: bool,
    /// Detector confidence, 0..1.
    pub confidence: f32,
    /// Estimated yaw, in degrees.
    pub yaw_deg: f32,
    /// Distance between the outer-eye landmarks, in pixels.
    pub eye_distance_px: f32,
    /// Composite 0..1 quality score.
    pub quality_score: f32,
    /// Capture timestamp, milliseconds since challenge start.
    pub timestamp_ms: u64,
    /// Present when detection failed or quality was too poor to trust.
    pub failure_reason: Option<String>,
}

/// Supporting detail behind a [`LivenessResult`] verdict.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct LivenessDetails {
    /// Per-pose geometric analyses, in challenge order.
    pub pose_analyses: Vec<PoseAnalysis>,
    /// Cross-pose descriptor consistency score, 0..1.
    pub consistency: f32,
    /// Per-pose angle-adherence scores, 0..1.
    pub angle_results: Vec<f32>,
    /// Whether the static-attack heuristic fired.
    pub static_suspected: bool,
}

/// Fused verdict of the 3-pose liveness challenge.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct LivenessResult {
    /// `true` iff the fused score clears the bar and no static attack was
    /// suspected.
    pub is_live: bool,
    /// Fused 0..1 liveness score.
    pub score: f32,
    /// Human-readable verdict reason.
    pub reason: String,
    /// Supporting per-pose detail.
    pub details: LivenessDetails,
}

/// Result of comparing two face descriptors (C7).
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct MatchResult {
    /// `max(0, 1 - distance / 1.2)`.
    pub similarity: f32,
    /// Euclidean distance between the descriptors.
    pub distance: f32,
    /// `true` iff `distance < 0.6`.
    pub is_match: bool,
}

/// Biometric half of an [`Attestation`].
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct BiometricSummary {
    /// Face-match score (similarity, 0..1).
    pub match_score: f32,
    /// Liveness verdict.
    pub is_live: bool,
    /// Liveness fused score.
    pub liveness_score: f32,
    /// Human-readable verification status, e.g. `"verified"`, `"failed"`.
    pub verification_status: String,
}

/// The final record merging MRZ identity, document type, and biometric
/// verdict (C9). The crate's one JSON wire type (§6).
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Attestation {
    /// Given name(s), from the MRZ.
    pub first_name: String,
    /// Surname, from the MRZ.
    pub last_name: String,
    /// Document / passport number.
    pub id_number: String,
    /// ISO `YYYY-MM-DD`, or `"UNKNOWN"`.
    pub date_of_birth: String,
    /// `M`, `F`, or `X`.
    pub gender: char,
    /// ISO `YYYY-MM-DD`, or `"UNKNOWN"`.
    pub expiry_date: String,
    /// 3-letter nationality code.
    pub nationality: String,
    /// Detected document format, as its ICAO label (`"TD1"`/`"TD2"`/`"TD3"`).
    pub document_type: String,
    /// Biometric verdict.
    pub biometrics: BiometricSummary,
    /// Unix timestamp, milliseconds, of assembly.
    pub timestamp_ms: u64,
}
