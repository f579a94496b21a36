//! Image preprocessor (C1): grayscale, contrast, deskew, binarize.
//!
//! Mirrors the scoped-acquisition idiom the teacher uses for native buffers:
//! every `Mat` allocated while preprocessing a frame is pushed onto a
//! [`MatArena`] and released, in reverse order, on every exit path.

use opencv::{
    core::{Mat, Point, Size, BORDER_REPLICATE},
    imgproc,
    prelude::*,
};

/// CLAHE clip limit.
const CLAHE_CLIP_LIMIT: f64 = 3.0;
/// CLAHE tile grid size (square).
const CLAHE_TILE: i32 = 8;
/// Bilateral filter sigma (color and space share one conservative value).
const BILATERAL_SIGMA: f64 = 50.0;
/// Canny low/high thresholds.
const CANNY_THRESHOLDS: (f64, f64) = (50.0, 150.0);
/// Near-horizontal segment angle tolerance, in degrees.
const NEAR_HORIZONTAL_DEG: f64 = 15.0;
/// Minimum median skew angle worth correcting, in degrees.
const MIN_SKEW_DEG: f64 = 0.5;
/// Adaptive threshold block size.
const ADAPTIVE_BLOCK_SIZE: i32 = 11;
/// Adaptive threshold constant subtracted from the mean.
const ADAPTIVE_C: f64 = 2.0;

/// A scoped stack of native `Mat` allocations, released in reverse order
/// when dropped (success or failure — `Drop` always runs).
#[derive(Default)]
pub struct MatArena {
    mats: Vec<Mat>,
}

impl MatArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `mat`, returning a reference valid for the
    /// arena's lifetime.
    pub fn track(&mut self, mat: Mat) -> &Mat {
        self.mats.push(mat);
        self.mats.last().expect("just pushed")
    }
}

impl Drop for MatArena {
    fn drop(&mut self) {
        while self.mats.pop().is_some() {}
    }
}

/// Runs the C1 pipeline on `input`, returning a binarized `Mat` ready for
/// OCR. Each step is conditional on the previous succeeding: any `opencv`
/// error short-circuits and surfaces to the caller, but native buffers
/// allocated up to that point are still released via `MatArena`'s `Drop`.
pub fn preprocess(input: &Mat) -> opencv::Result<Mat> {
    let mut arena = MatArena::new();

    let mut gray = Mat::default();
    imgproc::cvt_color(input, &mut gray, imgproc::COLOR_RGBA2GRAY, 0)?;
    let gray = arena.track(gray).clone();

    let contrasted = enhance_contrast(&gray, &mut arena)?;

    let mut smoothed = Mat::default();
    imgproc::bilateral_filter(&contrasted, &mut smoothed, 5, BILATERAL_SIGMA, BILATERAL_SIGMA, opencv::core::BORDER_DEFAULT)?;
    let smoothed = arena.track(smoothed).clone();

    let deskewed = deskew(&smoothed, &mut arena)?;

    let mut thresholded = Mat::default();
    imgproc::adaptive_threshold(
        &deskewed,
        &mut thresholded,
        255.0,
        imgproc::ADAPTIVE_THRESH_GAUSSIAN_C,
        imgproc::THRESH_BINARY,
        ADAPTIVE_BLOCK_SIZE,
        ADAPTIVE_C,
    )?;
    let thresholded = arena.track(thresholded).clone();

    let mut closed = Mat::default();
    let kernel = imgproc::get_structuring_element(imgproc::MORPH_RECT, Size::new(2, 1), Point::new(-1, -1))?;
    imgproc::morphology_ex(
        &thresholded,
        &mut closed,
        imgproc::MORPH_CLOSE,
        &kernel,
        Point::new(-1, -1),
        1,
        opencv::core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;

    Ok(closed)
}

/// CLAHE with a conservative clip limit, falling back to global histogram
/// equalization if CLAHE construction fails (spec: "if unavailable, fall
/// back to global histogram equalization").
fn enhance_contrast(gray: &Mat, arena: &mut MatArena) -> opencv::Result<Mat> {
    match imgproc::create_clahe(CLAHE_CLIP_LIMIT, Size::new(CLAHE_TILE, CLAHE_TILE)) {
        Ok(mut clahe) => {
            let mut out = Mat::default();
            clahe.apply(gray, &mut out)?;
            Ok(arena.track(out).clone())
        }
        Err(_) => {
            let mut out = Mat::default();
            imgproc::equalize_hist(gray, &mut out)?;
            Ok(arena.track(out).clone())
        }
    }
}

/// Detects and corrects document skew via Canny + probabilistic Hough
/// transform. Skips rotation when the median near-horizontal angle is
/// below [`MIN_SKEW_DEG`].
fn deskew(input: &Mat, arena: &mut MatArena) -> opencv::Result<Mat> {
    let mut edges = Mat::default();
    imgproc::canny(input, &mut edges, CANNY_THRESHOLDS.0, CANNY_THRESHOLDS.1, 3, false)?;
    let edges = arena.track(edges).clone();

    let mut lines = opencv::core::Vector::<opencv::core::Vec4i>::new();
    imgproc::hough_lines_p(&edges, &mut lines, 1.0, std::f64::consts::PI / 180.0, 50, 50.0, 10.0)?;

    let mut angles = Vec::new();
    for line in &lines {
        let [x1, y1, x2, y2] = [line[0] as f64, line[1] as f64, line[2] as f64, line[3] as f64];
        let angle = (y2 - y1).atan2(x2 - x1).to_degrees();
        if angle.abs() < NEAR_HORIZONTAL_DEG {
            angles.push(angle);
        }
    }

    if angles.is_empty() {
        return Ok(input.clone());
    }
    angles.sort_by(f64::total_cmp);
    let median = angles[angles.len() / 2];
    if median.abs() < MIN_SKEW_DEG {
        return Ok(input.clone());
    }

    let center = opencv::core::Point2f::new((input.cols() / 2) as f32, (input.rows() / 2) as f32);
    let rotation = imgproc::get_rotation_matrix_2d(center, -median, 1.0)?;
    let mut rotated = Mat::default();
    opencv::imgproc::warp_affine(
        input,
        &mut rotated,
        &rotation,
        input.size()?,
        imgproc::INTER_LINEAR,
        BORDER_REPLICATE,
        opencv::core::Scalar::default(),
    )?;
    Ok(arena.track(rotated).clone())
}
