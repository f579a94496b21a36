//! Face extraction (C4) and matching (C7).

pub mod matcher;
pub mod opencv_detector;

use crate::{
    collaborators::FaceDetectorCollaborator,
    error::ErrorKind,
    types::{Frame, Portrait, DESCRIPTOR_LEN},
};

/// Minimum confidence for the accurate detector.
const ACCURATE_MIN_CONFIDENCE: f32 = 0.3;
/// Input size for the fast fallback detector.
const FAST_INPUT_SIZE: u32 = 512;
/// Score threshold for the fast fallback detector.
const FAST_SCORE_THRESHOLD: f32 = 0.3;
/// Padding applied to the detected bounding box on every side.
const CROP_PADDING_PX: i32 = 20;

/// Extracts the portrait from the front-of-document frame (C4): high-
/// accuracy detection first, falling back to the fast detector, then a
/// padded crop and descriptor copy.
pub fn extract_portrait(
    detector: &dyn FaceDetectorCollaborator,
    frame: &Frame,
) -> Result<Portrait, ErrorKind> {
    let detection = detector
        .detect_accurate(frame, ACCURATE_MIN_CONFIDENCE)
        .or_else(|| detector.detect_fast(frame, FAST_INPUT_SIZE, FAST_SCORE_THRESHOLD))
        .ok_or(ErrorKind::NoFaceOnDocument)?;

    if detection.descriptor.len() != DESCRIPTOR_LEN {
        return Err(ErrorKind::DescriptorInvalid);
    }

    let (x, y, w, h) = detection.bbox;
    let crop = padded_crop(frame, x, y, w, h, CROP_PADDING_PX);

    Ok(Portrait { crop, descriptor: detection.descriptor })
}

/// Crops `frame` to the bounding box `(x, y, w, h)` expanded by `padding` on
/// every side, clamped to the frame bounds.
fn padded_crop(frame: &Frame, x: i32, y: i32, w: i32, h: i32, padding: i32) -> Frame {
    let x0 = (x - padding).max(0);
    let y0 = (y - padding).max(0);
    let x1 = (x + w + padding).min(frame.width as i32);
    let y1 = (y + h + padding).min(frame.height as i32);
    let crop_w = (x1 - x0).max(0) as u32;
    let crop_h = (y1 - y0).max(0) as u32;

    let mut rgba = Vec::with_capacity((crop_w * crop_h * 4) as usize);
    for row in 0..crop_h {
        let src_y = y0 as u32 + row;
        let row_start = ((src_y * frame.width + x0 as u32) * 4) as usize;
        let row_end = row_start + (crop_w * 4) as usize;
        if row_end <= frame.rgba.len() {
            rgba.extend_from_slice(&frame.rgba[row_start..row_end]);
        }
    }

    Frame::new(crop_w, crop_h, rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::Detection;

    struct StubDetector {
        accurate: Option<Detection>,
        fast: Option<Detection>,
    }

    impl FaceDetectorCollaborator for StubDetector {
        fn detect_accurate(&self, _frame: &Frame, _min_confidence: f32) -> Option<Detection> {
            self.accurate.clone()
        }

        fn detect_fast(&self, _frame: &Frame, _input_size: u32, _score_threshold: f32) -> Option<Detection> {
            self.fast.clone()
        }
    }

    fn blank_frame(width: u32, height: u32) -> Frame {
        Frame::new(width, height, vec![0; (width * height * 4) as usize])
    }

    #[test]
    fn falls_back_to_fast_detector_when_accurate_fails() {
        let detection =
            Detection { bbox: (10, 10, 50, 50), landmarks68: vec![], descriptor: vec![0.0; 128], confidence: 0.5 };
        let detector = StubDetector { accurate: None, fast: Some(detection) };
        let portrait = extract_portrait(&detector, &blank_frame(200, 200)).expect("extracts");
        assert_eq!(portrait.descriptor.len(), 128);
    }

    #[test]
    fn fails_with_no_face_on_document_when_both_detectors_miss() {
        let detector = StubDetector { accurate: None, fast: None };
        let err = extract_portrait(&detector, &blank_frame(200, 200)).unwrap_err();
        assert!(matches!(err, ErrorKind::NoFaceOnDocument));
    }

    #[test]
    fn rejects_short_descriptor() {
        let detection =
            Detection { bbox: (0, 0, 10, 10), landmarks68: vec![], descriptor: vec![0.0; 64], confidence: 0.9 };
        let detector = StubDetector { accurate: Some(detection), fast: None };
        let err = extract_portrait(&detector, &blank_frame(50, 50)).unwrap_err();
        assert!(matches!(err, ErrorKind::DescriptorInvalid));
    }
}
