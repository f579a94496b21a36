//! End-to-end exercises of the phase controller against mocked camera and
//! face-detector collaborators (§8's boundary scenarios). Requires the
//! `test-util` feature, which exposes `mockall`-generated collaborator mocks
//! as an ordinary part of the library surface (see `collaborators.rs`).

#![cfg(feature = "test-util")]

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use idv_core::{
    collaborators::{Detection, Facing, MockCameraCollaborator, MockFaceDetectorCollaborator, StreamId},
    error::ErrorKind,
    phase::{Phase, PhaseController},
    types::Frame,
};
use mockall::predicate::eq;
use mrz_engine::{ChecksumReport, DocumentType, MrzQuality, MrzRawLines, MrzRecord, QualityBand};

fn sample_mrz() -> MrzRecord {
    MrzRecord {
        first_name: "ANNA MARIA".to_owned(),
        last_name: "ERIKSSON".to_owned(),
        id_number: "D23145890".to_owned(),
        date_of_birth: "1974-08-12".to_owned(),
        gender: 'F',
        expiry_date: "2012-04-15".to_owned(),
        nationality: "UTO".to_owned(),
        document_type: DocumentType::Td1,
        raw_lines: MrzRawLines { lines: vec![] },
        quality: MrzQuality { score: 100, band: QualityBand::High, issues: vec![] },
        checksum_report: ChecksumReport::default(),
    }
}

fn blank_frame() -> Frame {
    Frame::new(200, 200, vec![0; 200 * 200 * 4])
}

fn landmarks_for_yaw(target_yaw_deg: f32) -> Vec<(f32, f32)> {
    let mut points = vec![(0.0_f32, 0.0_f32); 68];
    let (left_x, right_x, eye_y) = (100.0_f32, 160.0_f32, 100.0_f32);
    let eye_distance = right_x - left_x;
    let nose_offset = (target_yaw_deg / 45.0) * eye_distance;
    points[36] = (left_x, eye_y);
    points[45] = (right_x, eye_y);
    points[30] = ((left_x + right_x) / 2.0 + nose_offset, eye_y);
    points
}

fn detection(bbox: (i32, i32, i32, i32), yaw_deg: f32, descriptor: f32) -> Detection {
    Detection {
        bbox,
        landmarks68: landmarks_for_yaw(yaw_deg),
        descriptor: vec![descriptor; 128],
        confidence: 0.9,
    }
}

/// Sets up a camera mock that serves `document` once (environment facing)
/// and then `poses`, in order, once each (user facing).
fn camera_mock(document: Frame, poses: Vec<Frame>) -> MockCameraCollaborator {
    let mut camera = MockCameraCollaborator::new();
    camera
        .expect_acquire()
        .with(eq(Facing::Environment), eq((1280, 720)))
        .times(1)
        .returning(|_, _| Ok(StreamId(0)));
    camera
        .expect_current_frame()
        .with(eq(StreamId(0)))
        .times(1)
        .returning(move |_| Ok(document.clone()));
    camera
        .expect_acquire()
        .with(eq(Facing::User), eq((1280, 720)))
        .times(1)
        .returning(|_, _| Ok(StreamId(1)));

    let queue = Rc::new(RefCell::new(VecDeque::from(poses)));
    camera.expect_current_frame().with(eq(StreamId(1))).times(3).returning(move |_| {
        Ok(queue.borrow_mut().pop_front().expect("one frame per pose"))
    });
    camera.expect_release().times(2).return_const(());
    camera
}

/// Sets up a face-detector mock that returns `document_detection` for the
/// portrait-extraction call, then one detection per pose, in order.
fn detector_mock(document_detection: Detection, pose_detections: Vec<Detection>) -> MockFaceDetectorCollaborator {
    let mut detector = MockFaceDetectorCollaborator::new();
    let queue = Rc::new(RefCell::new(VecDeque::from(pose_detections)));
    let mut first = Some(document_detection);
    detector.expect_detect_accurate().times(4).returning(move |_, _| {
        first.take().or_else(|| queue.borrow_mut().pop_front())
    });
    detector
}

async fn run_to_liveness(
    mut controller: PhaseController,
    mut camera: MockCameraCollaborator,
    detector: MockFaceDetectorCollaborator,
) -> (PhaseController, Result<(), ErrorKind>) {
    controller.submit_mrz(sample_mrz()).expect("valid record advances");
    controller.submit_front_frame(&mut camera, &detector).expect("portrait extracted");
    assert_eq!(controller.phase(), Phase::AwaitLiveness);
    let result = controller.run_liveness(&mut camera, &detector).await;
    (controller, result)
}

#[tokio::test(start_paused = true)]
async fn happy_path_reaches_submitted() {
    let document = detection((0, 0, 30, 60), 0.0, 0.05);
    let poses = vec![
        detection((0, 0, 30, 60), 0.0, 0.05),
        detection((0, 0, 70, 80), -20.0, 0.06),
        detection((0, 0, 50, 55), 20.0, 0.04),
    ];

    let camera = camera_mock(blank_frame(), vec![blank_frame(), blank_frame(), blank_frame()]);
    let detector = detector_mock(document, poses);

    let (mut controller, result) = run_to_liveness(PhaseController::new(), camera, detector).await;
    result.expect("liveness and match both pass");
    assert_eq!(controller.phase(), Phase::Review);

    let attestation = controller.submit().expect("assembles");
    assert_eq!(controller.phase(), Phase::Submitted);
    assert_eq!(attestation.biometrics.verification_status, "verified");
    assert!(attestation.biometrics.is_live);
}

#[tokio::test(start_paused = true)]
async fn mismatched_face_blocks_submission() {
    // Document portrait is far from every selfie pose descriptor.
    let document = detection((0, 0, 30, 60), 0.0, 5.0);
    let poses = vec![
        detection((0, 0, 30, 60), 0.0, 0.05),
        detection((0, 0, 70, 80), -20.0, 0.06),
        detection((0, 0, 50, 55), 20.0, 0.04),
    ];

    let camera = camera_mock(blank_frame(), vec![blank_frame(), blank_frame(), blank_frame()]);
    let detector = detector_mock(document, poses);

    let (controller, result) = run_to_liveness(PhaseController::new(), camera, detector).await;
    assert!(matches!(result.unwrap_err(), ErrorKind::FaceMismatch { .. }));
    assert_eq!(controller.phase(), Phase::AwaitLiveness);
}

#[tokio::test(start_paused = true)]
async fn static_picture_attack_is_rejected() {
    // Every pose reports the identical descriptor, bbox, and a perfectly
    // on-target yaw -- the hallmark of a printed photo held in front of the
    // camera rather than a live, moving face.
    let bbox = (0, 0, 60, 70);
    let document = detection(bbox, 0.0, 0.05);
    let poses = vec![
        detection(bbox, 0.0, 0.05),
        detection(bbox, -20.0, 0.05),
        detection(bbox, 20.0, 0.05),
    ];

    let camera = camera_mock(blank_frame(), vec![blank_frame(), blank_frame(), blank_frame()]);
    let detector = detector_mock(document, poses);

    let (controller, result) = run_to_liveness(PhaseController::new(), camera, detector).await;
    assert!(matches!(result.unwrap_err(), ErrorKind::LivenessFailed { .. }));
    assert_eq!(controller.phase(), Phase::AwaitLiveness);
}
