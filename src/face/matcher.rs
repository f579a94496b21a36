//! Face matcher (C7): Euclidean distance between descriptors.

use crate::{
    error::ErrorKind,
    types::{MatchResult, DESCRIPTOR_LEN},
};

/// Distance below which two descriptors are considered the same person.
const MATCH_THRESHOLD: f32 = 0.6;
/// Divisor used to turn distance into a display similarity.
const SIMILARITY_SCALE: f32 = 1.2;

/// Compares `portrait_descriptor` (from the document) against
/// `selfie_descriptor` (from the front-pose liveness capture).
pub fn match_descriptors(
    portrait_descriptor: &[f32],
    selfie_descriptor: &[f32],
) -> Result<MatchResult, ErrorKind> {
    if portrait_descriptor.len() != DESCRIPTOR_LEN || selfie_descriptor.len() != DESCRIPTOR_LEN {
        return Err(ErrorKind::DescriptorInvalid);
    }

    let distance = portrait_descriptor
        .iter()
        .zip(selfie_descriptor)
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f32>()
        .sqrt();

    let similarity = (1.0 - distance / SIMILARITY_SCALE).max(0.0);
    let is_match = distance < MATCH_THRESHOLD;

    Ok(MatchResult { similarity, distance, is_match })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_descriptors_match_perfectly() {
        let descriptor = vec![0.1_f32; DESCRIPTOR_LEN];
        let result = match_descriptors(&descriptor, &descriptor).expect("valid lengths");
        assert!(result.is_match);
        assert!((result.distance).abs() < f32::EPSILON);
        assert!((result.similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatch_reports_expected_similarity() {
        let mut other = vec![0.0_f32; DESCRIPTOR_LEN];
        // Distance 0.72 across 128 dims: each dim contributes 0.72/sqrt(128).
        let per_dim = 0.72 / (DESCRIPTOR_LEN as f32).sqrt();
        other.iter_mut().for_each(|v| *v = per_dim);
        let zero = vec![0.0_f32; DESCRIPTOR_LEN];
        let result = match_descriptors(&zero, &other).expect("valid lengths");
        assert!(!result.is_match);
        assert!((result.distance - 0.72).abs() < 1e-3);
        assert!((result.similarity - 0.40).abs() < 0.01);
    }

    #[test]
    fn rejects_wrong_length_descriptors() {
        let err = match_descriptors(&[0.0; 10], &[0.0; DESCRIPTOR_LEN]).unwrap_err();
        assert!(matches!(err, ErrorKind::DescriptorInvalid));
    }
}
