//! Demo binary: runs the verification pipeline against a directory of test
//! fixture frames and prints the resulting attestation as pretty JSON.
//!
//! Expected fixture layout under `--fixtures`:
//! `back.png` (document back, MRZ), `front.png` (document front,
//! portrait), `pose_front.png`, `pose_left.png`, `pose_right.png` (the
//! three liveness poses).

use std::{collections::HashMap, path::Path};

use clap::Parser;
use eyre::{Context, Result};
use idv_core::{
    cli::Cli,
    collaborators::{CameraCollaborator, Detection, Facing, FaceDetectorCollaborator, StreamId},
    config::Config,
    error::ErrorKind,
    phase::PhaseController,
    types::Frame,
};

fn load_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path).wrap_err_with(|| format!("opening fixture {}", path.display()))?;
    let rgba = image.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    Ok(Frame::new(width, height, rgba.into_raw()))
}

/// Demo camera collaborator: each logical facing serves a fixed queue of
/// fixture frames, advancing one frame per `current_frame` call.
struct FixtureCamera {
    queues: HashMap<Facing, Vec<Frame>>,
    cursor: HashMap<StreamId, usize>,
    next_id: u64,
}

impl FixtureCamera {
    fn new(document: Frame, poses: Vec<Frame>) -> Self {
        let mut queues = HashMap::new();
        queues.insert(Facing::Environment, vec![document]);
        queues.insert(Facing::User, poses);
        Self { queues, cursor: HashMap::new(), next_id: 0 }
    }
}

impl CameraCollaborator for FixtureCamera {
    fn acquire(&mut self, facing: Facing, _preferred_resolution: (u32, u32)) -> Result<StreamId, ErrorKind> {
        let id = StreamId(self.next_id);
        self.next_id += 1;
        self.cursor.insert(id, 0);
        tracing::debug!(?facing, "acquired fixture camera stream");
        Ok(id)
    }

    fn release(&mut self, stream: StreamId) {
        self.cursor.remove(&stream);
    }

    fn current_frame(&self, stream: StreamId) -> Result<Frame, ErrorKind> {
        // Demo-only: we don't track which facing a stream belongs to, so we
        // just walk whichever queue still has frames left for this cursor.
        let index = *self.cursor.get(&stream).unwrap_or(&0);
        for queue in self.queues.values() {
            if let Some(frame) = queue.get(index) {
                return Ok(frame.clone());
            }
        }
        Err(ErrorKind::NoCamera)
    }
}

/// Demo detector collaborator: always reports a plausible whole-frame face
/// so the pipeline is exercisable without real model weights on hand.
struct StubDetector;

impl FaceDetectorCollaborator for StubDetector {
    fn detect_accurate(&self, frame: &Frame, _min_confidence: f32) -> Option<Detection> {
        Some(Detection {
            bbox: (0, 0, frame.width as i32, frame.height as i32),
            landmarks68: vec![(0.0, 0.0); 68],
            descriptor: vec![0.1; 128],
            confidence: 0.9,
        })
    }

    fn detect_fast(&self, frame: &Frame, _input_size: u32, _score_threshold: f32) -> Option<Detection> {
        self.detect_accurate(frame, 0.0)
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_or_default(path).await,
        None => Config::default(),
    };
    tracing::info!(?config, "loaded configuration");

    let front = load_frame(&cli.fixtures.join("front.png"))?;
    let poses = vec![
        load_frame(&cli.fixtures.join("pose_front.png"))?,
        load_frame(&cli.fixtures.join("pose_left.png"))?,
        load_frame(&cli.fixtures.join("pose_right.png"))?,
    ];

    let back_mat = opencv::imgcodecs::imread(
        cli.fixtures.join("back.png").to_string_lossy().as_ref(),
        opencv::imgcodecs::IMREAD_COLOR,
    )?;
    let ocr = mrz_engine::TesseractOcr::default();
    let mrz = mrz_engine::extract_mrz(&ocr, &back_mat, 24).wrap_err("extracting MRZ")?;

    let mut camera = FixtureCamera::new(front, poses);
    let detector = StubDetector;

    let mut controller = PhaseController::new();
    controller.submit_mrz(mrz).wrap_err("submitting MRZ record")?;
    controller.submit_front_frame(&mut camera, &detector).wrap_err("extracting portrait")?;
    controller.run_liveness(&mut camera, &detector).await.wrap_err("running liveness challenge")?;
    let attestation = controller.submit().wrap_err("assembling attestation")?;

    println!("{}", serde_json::to_string_pretty(&attestation)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    idv_core::async_main(run(cli))
}
