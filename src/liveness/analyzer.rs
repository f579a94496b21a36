//! Pose analyzer (C6): per-pose geometry, angle scoring, cross-pose
//! consistency, the static-attack heuristic, and liveness fusion.

use crate::{
    collaborators::Detection,
    types::{LivenessDetails, LivenessResult, Pose, PoseAnalysis},
};

/// Landmark indices used for yaw estimation (68-point scheme).
const LEFT_EYE_OUTER: usize = 36;
const RIGHT_EYE_OUTER: usize = 45;
const NOSE_TIP: usize = 30;

/// Below this eye distance (px) a pose is considered too small to trust.
const MIN_EYE_DISTANCE_PX: f32 = 10.0;

/// Builds a [`PoseAnalysis`] from a single detection, or a failure-flagged
/// analysis if no detection was made.
#[must_use]
pub fn analyze_pose(
    pose: Pose,
    detection: Option<&Detection>,
    frame_size: (u32, u32),
    timestamp_ms: u64,
) -> PoseAnalysis {
    let Some(detection) = detection else {
        return PoseAnalysis {
            pose,
            detected: false,
            confidence: 0.0,
            yaw_deg: 0.0,
            eye_distance_px: 0.0,
            quality_score: 0.0,
            timestamp_ms,
            failure_reason: Some("no face detected".to_owned()),
        };
    };

    if detection.landmarks68.len() <= RIGHT_EYE_OUTER {
        return PoseAnalysis {
            pose,
            detected: false,
            confidence: detection.confidence,
            yaw_deg: 0.0,
            eye_distance_px: 0.0,
            quality_score: 0.0,
            timestamp_ms,
            failure_reason: Some("insufficient landmarks".to_owned()),
        };
    }

    let left_eye = detection.landmarks68[LEFT_EYE_OUTER];
    let right_eye = detection.landmarks68[RIGHT_EYE_OUTER];
    let nose = detection.landmarks68[NOSE_TIP];

    let eye_center_x = (left_eye.0 + right_eye.0) / 2.0;
    let eye_distance = (right_eye.0 - left_eye.0).abs();

    if eye_distance < MIN_EYE_DISTANCE_PX {
        return PoseAnalysis {
            pose,
            detected: true,
            confidence: detection.confidence,
            yaw_deg: 0.0,
            eye_distance_px: eye_distance,
            quality_score: 0.0,
            timestamp_ms,
            failure_reason: Some("eye distance too small".to_owned()),
        };
    }

    let nose_offset = nose.0 - eye_center_x;
    let yaw_deg = ((nose_offset / eye_distance) * 45.0).clamp(-45.0, 45.0);
    let quality_score = face_quality(detection, frame_size, left_eye, right_eye);

    PoseAnalysis {
        pose,
        detected: true,
        confidence: detection.confidence,
        yaw_deg,
        eye_distance_px: eye_distance,
        quality_score,
        timestamp_ms,
        failure_reason: None,
    }
}

fn face_quality(
    detection: &Detection,
    frame_size: (u32, u32),
    left_eye: (f32, f32),
    right_eye: (f32, f32),
) -> f32 {
    let (_, _, w, h) = detection.bbox;
    let (frame_w, frame_h) = frame_size;
    let face_area = f64::from(w) * f64::from(h);
    let frame_area = f64::from(frame_w) * f64::from(frame_h);
    let size_ratio = if frame_area > 0.0 { face_area / frame_area } else { 0.0 };
    let size_score = if (0.1..=0.4).contains(&size_ratio) { 1.0 } else { 0.5 };

    let aspect = if h != 0 { f64::from(w) / f64::from(h) } else { 0.0 };
    let aspect_score = if (0.6..=1.0).contains(&aspect) { 1.0 } else { 0.5 };

    let eye_level = f64::from((left_eye.1 - right_eye.1).abs()) / 20.0;
    let eye_level_score = (1.0 - eye_level).max(0.0);

    ((size_score + aspect_score + eye_level_score) / 3.0) as f32
}

/// Angle-adherence score for one pose analysis against its pose's target
/// yaw, per the §4.4 banding rules.
#[must_use]
pub fn angle_score(analysis: &PoseAnalysis) -> f32 {
    if !analysis.detected {
        return 0.0;
    }
    let target = analysis.pose.target_yaw_deg();
    let diff = (analysis.yaw_deg - target).abs();

    if target == 0.0 {
        return center_band(diff);
    }

    let same_direction = analysis.yaw_deg.signum() == target.signum();
    if !same_direction {
        return 0.1;
    }
    let mut score = side_band(diff);
    if analysis.yaw_deg.abs() >= 15.0 {
        score = (score * 1.1).min(1.0);
    }
    score
}

fn center_band(diff: f32) -> f32 {
    if diff <= 10.0 {
        1.0
    } else if diff <= 15.0 {
        0.8
    } else if diff <= 20.0 {
        0.5
    } else if diff <= 30.0 {
        0.2
    } else {
        0.0
    }
}

fn side_band(diff: f32) -> f32 {
    if diff <= 10.0 {
        1.0
    } else if diff <= 15.0 {
        0.8
    } else if diff <= 25.0 {
        0.6
    } else if diff <= 35.0 {
        0.3
    } else {
        0.1
    }
}

/// Cross-pose descriptor consistency: `1 - min(avg_pairwise_distance, 1)`.
/// Requires at least two valid descriptors; otherwise 0.
#[must_use]
pub fn consistency_score(descriptors: &[Vec<f32>]) -> f32 {
    let valid: Vec<&Vec<f32>> = descriptors.iter().filter(|d| d.len() == 128).collect();
    if valid.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    let mut count = 0usize;
    for i in 0..valid.len() {
        for j in (i + 1)..valid.len() {
            total += euclidean_distance(valid[i], valid[j]);
            count += 1;
        }
    }
    let avg = if count > 0 { total / count as f32 } else { 0.0 };
    1.0 - avg.min(1.0)
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f32>().sqrt()
}

/// Static-attack heuristic: four weighted indicators, suspected iff their
/// total weight over 5.5 exceeds 0.5.
#[must_use]
pub fn static_suspected(
    consistency: f32,
    analyses: &[PoseAnalysis],
    inter_pose_gaps_ms: &[u64],
) -> bool {
    let too_consistent = if consistency > 0.97 { 2.0 } else { 0.0 };

    let perfect_angles =
        analyses.iter().filter(|a| a.detected && (a.yaw_deg - a.pose.target_yaw_deg()).abs() < 5.0).count();
    let perfect_angles_weight = if perfect_angles >= 3 {
        1.5
    } else if perfect_angles >= 2 {
        1.0
    } else {
        0.0
    };

    let mean_gap = if inter_pose_gaps_ms.is_empty() {
        u64::MAX
    } else {
        inter_pose_gaps_ms.iter().sum::<u64>() / inter_pose_gaps_ms.len() as u64
    };
    let too_fast = if mean_gap < 800 { 1.0 } else { 0.0 };

    let qualities: Vec<f64> = analyses.iter().map(|a| f64::from(a.quality_score)).collect();
    let no_variance = if qualities.len() > 1 && variance(&qualities) < 0.002 { 1.0 } else { 0.0 };

    let total_weight = too_consistent + perfect_angles_weight + too_fast + no_variance;
    total_weight / 5.5 > 0.5
}

fn variance(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// Fuses per-pose analyses, angle scores, and consistency into the final
/// [`LivenessResult`], per the §4.4 fusion formula.
#[must_use]
pub fn fuse(
    analyses: Vec<PoseAnalysis>,
    descriptors: &[Vec<f32>],
    inter_pose_gaps_ms: &[u64],
) -> LivenessResult {
    let detected_count = analyses.iter().filter(|a| a.detected).count();
    let detection_rate = detected_count as f32 / analyses.len().max(1) as f32;

    let mean_quality = mean(analyses.iter().map(|a| a.quality_score));
    let mean_confidence = mean(analyses.iter().map(|a| a.confidence));
    let consistency = consistency_score(descriptors);

    let angle_results: Vec<f32> = analyses.iter().map(angle_score).collect();
    let mean_angle = mean(angle_results.iter().copied());

    let mut score = 0.3 * detection_rate
        + 0.2 * mean_quality
        + 0.1 * mean_confidence
        + 0.2 * consistency
        + 0.2 * mean_angle;

    let static_flag = static_suspected(consistency, &analyses, inter_pose_gaps_ms);
    if static_flag {
        score *= 0.5;
    }

    let is_live = score >= 0.7 && !static_flag;
    let reason = if static_flag {
        "static picture suspected".to_owned()
    } else if !is_live {
        format!("liveness score {score:.2} below threshold")
    } else {
        "live".to_owned()
    };

    LivenessResult {
        is_live,
        score,
        reason,
        details: LivenessDetails {
            pose_analyses: analyses,
            consistency,
            angle_results,
            static_suspected: static_flag,
        },
    }
}

fn mean(values: impl Iterator<Item = f32> + Clone) -> f32 {
    let count = values.clone().count();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f32>() / count as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(pose: Pose, yaw: f32, detected: bool) -> PoseAnalysis {
        PoseAnalysis {
            pose,
            detected,
            confidence: 0.9,
            yaw_deg: yaw,
            eye_distance_px: 60.0,
            quality_score: 0.9,
            timestamp_ms: 0,
            failure_reason: None,
        }
    }

    #[test]
    fn wrong_direction_pose_scores_low() {
        let analyses = vec![
            analysis(Pose::Front, 0.0, true),
            analysis(Pose::Left, 22.0, true),
            analysis(Pose::Right, -22.0, true),
        ];
        let scores: Vec<f32> = analyses.iter().map(angle_score).collect();
        let mean_score = scores.iter().sum::<f32>() / 3.0;
        assert!((mean_score - 0.4).abs() < 0.05, "got {mean_score}");
    }

    #[test]
    fn static_attack_flags_on_identical_fast_frames() {
        let descriptors = vec![vec![0.01_f32; 128], vec![0.0_f32; 128], vec![0.0_f32; 128]];
        let analyses = vec![
            analysis(Pose::Front, 0.0, true),
            analysis(Pose::Left, -20.0, true),
            analysis(Pose::Right, 20.0, true),
        ];
        let consistency = consistency_score(&descriptors);
        assert!(static_suspected(consistency, &analyses, &[100, 100]));
    }

    #[test]
    fn consistency_requires_at_least_two_descriptors() {
        assert_eq!(consistency_score(&[vec![0.0_f32; 128]]), 0.0);
    }
}
