//! Verification core configuration settings.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::consts::{
    CONFIG_DIR, DESCRIPTOR_LEN, FACE_MATCH_THRESHOLD, LIVENESS_COUNTDOWN, LIVENESS_INTER_POSE_PAUSE,
    LIVENESS_SCORE_BAR, MRZ_CROP_START, MRZ_STRONG_BAR, MRZ_WEAK_BAR, VIDEO_READY_TIMEOUT,
};

/// Thresholds and timeouts used across the pipeline. Loaded from an
/// optional config file with built-in defaults, exactly like the teacher's
/// `Config`, minus the fleet/backend-sourced fields this headless core has
/// no use for.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Fraction down the frame where the MRZ band is assumed to start.
    pub mrz_crop_start: f64,
    /// Cleaned-text length at or above which an OCR strategy wins outright.
    pub mrz_strong_bar: usize,
    /// Cleaned-text length below which even the best strategy is unreadable.
    pub mrz_weak_bar: usize,
    /// Seconds of visible countdown before each liveness pose's frame grab.
    pub liveness_countdown_secs: u64,
    /// Seconds paused between liveness poses.
    pub liveness_inter_pose_pause_secs: u64,
    /// Liveness fusion score bar for `is_live`.
    pub liveness_score_bar: f32,
    /// Face-match distance below which two descriptors are the same person.
    pub face_match_threshold: f32,
    /// Required length of every stored biometric descriptor.
    pub descriptor_len: usize,
    /// Seconds to wait for the camera stream to become ready.
    pub video_ready_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mrz_crop_start: MRZ_CROP_START,
            mrz_strong_bar: MRZ_STRONG_BAR,
            mrz_weak_bar: MRZ_WEAK_BAR,
            liveness_countdown_secs: LIVENESS_COUNTDOWN.as_secs(),
            liveness_inter_pose_pause_secs: LIVENESS_INTER_POSE_PAUSE.as_secs(),
            liveness_score_bar: LIVENESS_SCORE_BAR,
            face_match_threshold: FACE_MATCH_THRESHOLD,
            descriptor_len: DESCRIPTOR_LEN,
            video_ready_timeout_secs: VIDEO_READY_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Tries to load config from the file system, or constructs a default
    /// config on failure.
    pub async fn load_or_default(path: &Path) -> Self {
        Self::load(path)
            .await
            .map_err(|err| {
                tracing::warn!("config loading failed, continuing with defaults: {err:#}");
            })
            .unwrap_or_default()
    }

    async fn load(path: &Path) -> Result<Self> {
        tracing::info!("loading config from {}", path.display());
        let contents = fs::read_to_string(path).await.wrap_err("reading config file")?;
        serde_json::from_str(&contents).wrap_err("parsing config file")
    }

    /// Stores the configuration settings to the file system.
    pub async fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self).wrap_err("serializing config")?;
        fs::write(path, json).await?;
        Ok(())
    }
}

/// Default path the config file is loaded from / stored to.
#[must_use]
pub fn default_config_path() -> PathBuf {
    Path::new(CONFIG_DIR).join("config.json")
}
