//! `opencv`-backed [`ImageOpsCollaborator`]: wraps `mrz_engine::preprocess`
//! so the same CLAHE/deskew/threshold pipeline used for MRZ crops is
//! available to any caller that only has a raw RGBA [`Frame`] (§6: "the core
//! must degrade gracefully to the raw frame if this backend is missing").

use opencv::{core::Mat, imgproc, prelude::*};

use crate::{collaborators::ImageOpsCollaborator, types::Frame};

fn frame_to_mat(frame: &Frame) -> opencv::Result<Mat> {
    let raw = Mat::from_slice(&frame.rgba)?;
    let mut rgba = Mat::default();
    raw.reshape(4, frame.height as i32)?.copy_to(&mut rgba)?;
    Ok(rgba)
}

fn mat_to_frame(mat: &Mat) -> opencv::Result<Frame> {
    let mut rgba = Mat::default();
    imgproc::cvt_color(mat, &mut rgba, imgproc::COLOR_GRAY2RGBA, 0)?;
    let bytes = rgba.data_bytes()?.to_vec();
    Ok(Frame::new(mat.cols() as u32, mat.rows() as u32, bytes))
}

/// The default, `opencv`-backed image-ops backend.
#[derive(Default)]
pub struct OpenCvImageOps;

impl ImageOpsCollaborator for OpenCvImageOps {
    fn preprocess(&self, frame: &Frame) -> Option<Frame> {
        let mat = frame_to_mat(frame).ok()?;
        let processed = mrz_engine::preprocess::preprocess(&mat).ok()?;
        mat_to_frame(&processed).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrades_to_none_on_malformed_frame() {
        // Too few bytes for the stated width/height -- `Mat::from_slice`
        // still succeeds on the raw buffer, but `reshape` to 4 channels at
        // this height fails, which should surface as `None`, not a panic.
        let ops = OpenCvImageOps;
        let frame = Frame::new(10, 10, vec![0; 4]);
        assert!(ops.preprocess(&frame).is_none());
    }
}
