//! Project constants.

use std::time::Duration;

/// Fraction down the frame where the MRZ band is assumed to start.
pub const MRZ_CROP_START: f64 = 0.65;
/// A cleaned OCR strategy result at or above this length wins outright.
pub const MRZ_STRONG_BAR: usize = 60;
/// Below this cleaned length even the best strategy is unreadable.
pub const MRZ_WEAK_BAR: usize = 30;

/// Visible countdown before each liveness pose's frame grab.
pub const LIVENESS_COUNTDOWN: Duration = Duration::from_secs(3);
/// Pause between liveness poses.
pub const LIVENESS_INTER_POSE_PAUSE: Duration = Duration::from_secs(1);
/// Liveness fusion score bar for `is_live`.
pub const LIVENESS_SCORE_BAR: f32 = 0.7;

/// Face-match distance below which two descriptors are the same person.
pub const FACE_MATCH_THRESHOLD: f32 = 0.6;
/// Required length of every stored biometric descriptor.
pub const DESCRIPTOR_LEN: usize = 128;

/// Default poll interval for `waitForVideoReady`.
pub const VIDEO_READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Default timeout for `waitForVideoReady`.
pub const VIDEO_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default path the config file is loaded from / stored to.
pub const CONFIG_DIR: &str = "/etc/idv-core/";
