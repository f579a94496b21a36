//! `opencv`-backed face detector collaborator: `FaceDetectorYN` for
//! detection + 128-d descriptors via `FaceRecognizerSF`, `Facemark` (LBF)
//! for the 68-point landmarks used by the liveness pose analyzer.

use std::path::Path;

use opencv::{
    core::{Mat, Rect, Size, Vector},
    face::{create_facemark_lbf, Facemark},
    objdetect::{FaceDetectorYN, FaceRecognizerSF},
    prelude::*,
};

use crate::collaborators::{Detection, FaceDetectorCollaborator};
use crate::types::Frame;

fn frame_to_mat(frame: &Frame) -> opencv::Result<Mat> {
    let raw = Mat::from_slice(&frame.rgba)?;
    let mut rgba = Mat::default();
    raw.reshape(4, frame.height as i32)?.copy_to(&mut rgba)?;
    Ok(rgba)
}

/// Detection/recognition backend bundling the three OpenCV model handles
/// needed to service [`FaceDetectorCollaborator`]. Model paths point at
/// ONNX/YAML files shipped alongside the binary.
pub struct OpenCvFaceDetector {
    detector: std::cell::RefCell<FaceDetectorYN>,
    recognizer: FaceRecognizerSF,
    facemark: std::cell::RefCell<opencv::core::Ptr<dyn Facemark>>,
}

impl OpenCvFaceDetector {
    /// Loads the three models from disk.
    ///
    /// # Errors
    ///
    /// Returns an `opencv::Error` if any model file fails to load.
    pub fn load(
        detector_model: &Path,
        recognizer_model: &Path,
        facemark_model: &Path,
    ) -> opencv::Result<Self> {
        let detector = FaceDetectorYN::create(
            &detector_model.to_string_lossy(),
            "",
            Size::new(320, 320),
            0.3,
            0.3,
            5000,
            0,
            0,
        )?;
        let recognizer =
            FaceRecognizerSF::create(&recognizer_model.to_string_lossy(), "", 0, 0)?;
        let mut facemark = create_facemark_lbf()?;
        facemark.load_model(&facemark_model.to_string_lossy())?;

        Ok(Self {
            detector: std::cell::RefCell::new(detector),
            recognizer,
            facemark: std::cell::RefCell::new(facemark),
        })
    }

    fn detect_with(
        &self,
        mat: &Mat,
        input_size: Size,
        score_threshold: f32,
    ) -> opencv::Result<Option<Detection>> {
        let mut detector = self.detector.borrow_mut();
        detector.set_input_size(input_size)?;
        detector.set_score_threshold(score_threshold)?;

        let mut faces = Mat::default();
        detector.detect(mat, &mut faces)?;
        if faces.rows() == 0 {
            return Ok(None);
        }

        let row = faces.row(0)?;
        let bbox = (
            *row.at::<f32>(0)? as i32,
            *row.at::<f32>(1)? as i32,
            *row.at::<f32>(2)? as i32,
            *row.at::<f32>(3)? as i32,
        );
        let confidence = *row.at::<f32>(14)?;

        let mut aligned = Mat::default();
        self.recognizer.align_crop_face(mat, &row, &mut aligned)?;
        let mut descriptor_mat = Mat::default();
        self.recognizer.feature(&aligned, &mut descriptor_mat)?;
        let descriptor: Vec<f32> =
            descriptor_mat.data_typed::<f32>()?.to_vec();

        let mut rois = Vector::<Rect>::new();
        rois.push(Rect::new(bbox.0, bbox.1, bbox.2, bbox.3));
        let mut landmarks = Vector::<Vector<opencv::core::Point2f>>::new();
        self.facemark.borrow_mut().fit(mat, &rois, &mut landmarks)?;
        let landmarks68 = landmarks
            .get(0)
            .ok()
            .map(|pts| pts.iter().map(|p| (p.x, p.y)).collect())
            .unwrap_or_default();

        Ok(Some(Detection { bbox, landmarks68, descriptor, confidence }))
    }
}

impl FaceDetectorCollaborator for OpenCvFaceDetector {
    fn detect_accurate(&self, frame: &Frame, min_confidence: f32) -> Option<Detection> {
        let mat = frame_to_mat(frame).ok()?;
        self.detect_with(&mat, Size::new(mat.cols(), mat.rows()), min_confidence)
            .ok()
            .flatten()
    }

    fn detect_fast(&self, frame: &Frame, input_size: u32, score_threshold: f32) -> Option<Detection> {
        let mat = frame_to_mat(frame).ok()?;
        let size = Size::new(input_size as i32, input_size as i32);
        self.detect_with(&mat, size, score_threshold).ok().flatten()
    }
}
