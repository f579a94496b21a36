//! Liveness engine (C5+C6): challenge orchestration and pose analysis.

pub mod analyzer;

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::{sleep, Duration, Instant};

use crate::{
    collaborators::{CameraCollaborator, Facing, FaceDetectorCollaborator},
    error::ErrorKind,
    types::{LivenessResult, Pose},
};

/// Visible countdown before each pose's frame grab.
const COUNTDOWN: Duration = Duration::from_secs(3);
/// Pause between poses.
const INTER_POSE_PAUSE: Duration = Duration::from_secs(1);
/// Detector confidence floor during the challenge.
const DETECTOR_CONFIDENCE: f32 = 0.3;
/// Detector input size for the fast fallback.
const FAST_INPUT_SIZE: u32 = 512;

/// Drives the FRONT -> LEFT -> RIGHT challenge. A re-entrancy guard (the
/// "running" boolean) prevents concurrent starts; it is cleared on every
/// terminal path via `Drop`, per the §9 design note ("replace the async UI
/// promise with an explicit state machine").
pub struct LivenessChallenge {
    running: AtomicBool,
}

impl Default for LivenessChallenge {
    fn default() -> Self {
        Self { running: AtomicBool::new(false) }
    }
}

/// One captured pose: the raw analysis plus its descriptor, used both for
/// fusion and as the selfie candidate (front pose only).
pub struct CapturedPose {
    /// Frame-relative capture timestamp.
    pub timestamp_ms: u64,
    /// Descriptor extracted from this pose's frame, if a face was found.
    pub descriptor: Option<Vec<f32>>,
}

impl LivenessChallenge {
    /// Creates an idle challenge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the full challenge against `camera`/`detector`. A second call
    /// while one is already running is a no-op that returns
    /// [`ErrorKind::Transient`].
    pub async fn run(
        &self,
        camera: &mut dyn CameraCollaborator,
        detector: &dyn FaceDetectorCollaborator,
    ) -> Result<(LivenessResult, Option<Vec<f32>>), ErrorKind> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ErrorKind::Transient { cause: "liveness challenge already running".to_owned() });
        }
        let _guard = RunningGuard(&self.running);

        let stream = camera.acquire(Facing::User, (1280, 720))?;
        let start = Instant::now();

        let mut analyses = Vec::with_capacity(Pose::ORDER.len());
        let mut descriptors = Vec::with_capacity(Pose::ORDER.len());
        let mut timestamps = Vec::with_capacity(Pose::ORDER.len());
        let mut front_descriptor = None;

        for (index, pose) in Pose::ORDER.iter().copied().enumerate() {
            sleep(COUNTDOWN).await;
            let frame = camera.current_frame(stream)?;
            let detection = detector
                .detect_accurate(&frame, DETECTOR_CONFIDENCE)
                .or_else(|| detector.detect_fast(&frame, FAST_INPUT_SIZE, DETECTOR_CONFIDENCE));

            let elapsed_ms = start.elapsed().as_millis() as u64;
            timestamps.push(elapsed_ms);

            let analysis = analyzer::analyze_pose(
                pose,
                detection.as_ref(),
                (frame.width, frame.height),
                elapsed_ms,
            );

            if let Some(detection) = &detection {
                descriptors.push(detection.descriptor.clone());
                if pose == Pose::Front {
                    front_descriptor = Some(detection.descriptor.clone());
                }
            }

            analyses.push(analysis);

            if index + 1 < Pose::ORDER.len() {
                sleep(INTER_POSE_PAUSE).await;
            }
        }

        camera.release(stream);

        let gaps: Vec<u64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
        let result = analyzer::fuse(analyses, &descriptors, &gaps);
        Ok((result, front_descriptor))
    }
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_challenge_is_not_running() {
        let challenge = LivenessChallenge::new();
        assert!(!challenge.running.load(Ordering::SeqCst));
    }
}
