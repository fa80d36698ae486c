//! Pose accuracy scoring.
//!
//! The primary method compares joint angles in the detected skeleton
//! against each pose's expected angles, scaled by a trimester tolerance.
//! When too few angle joints were detected for that to be meaningful,
//! scoring falls back to weighted keypoint distances. Scores are always
//! in [0, 100] and evaluation never fails: degraded input degrades the
//! score, not the pipeline.

use crate::registry::{AngleDefinition, ReferencePose, Trimester};
use crate::skeleton::{JointName, Keypoint, Skeleton};

/// Minimum summed angle weight for the angle method to be trusted.
const MIN_ANGLE_WEIGHT: f32 = 2.0;

/// Similarity assigned to an angle whose geometry is degenerate
/// (coincident joints give a zero-length ray).
const NEUTRAL_SIMILARITY: f32 = 0.5;

/// Classifier share when blending with the geometric score.
const CLASSIFIER_BLEND: f32 = 0.3;

/// Joint importance for the positional fallback. Eyes and ears carry no
/// postural signal and are excluded.
const POSITION_WEIGHTS: [(JointName, f32); 13] = [
    (JointName::LeftShoulder, 1.5),
    (JointName::RightShoulder, 1.5),
    (JointName::LeftHip, 1.5),
    (JointName::RightHip, 1.5),
    (JointName::LeftKnee, 1.2),
    (JointName::RightKnee, 1.2),
    (JointName::LeftAnkle, 1.0),
    (JointName::RightAnkle, 1.0),
    (JointName::LeftElbow, 1.0),
    (JointName::RightElbow, 1.0),
    (JointName::LeftWrist, 0.8),
    (JointName::RightWrist, 0.8),
    (JointName::Nose, 0.5),
];

/// Which method produced an [`Evaluation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMethod {
    Angles,
    Positions,
}

/// One scored angle: the measured value (if the geometry allowed one)
/// and its similarity to the expected angle.
#[derive(Debug, Clone)]
pub struct AngleScore {
    pub definition: AngleDefinition,
    pub measured: Option<f32>,
    /// Similarity in [0, 1].
    pub similarity: f32,
}

/// Scoring result for one frame.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Accuracy percentage in [0, 100].
    pub accuracy: f32,
    pub method: ScoringMethod,
    /// Per-angle breakdown; empty under the positional fallback.
    pub angle_scores: Vec<AngleScore>,
}

/// Optional learned scorer blended with the geometric score.
pub trait PoseClassifier: Send + Sync {
    /// Score a skeleton against a pose id, in [0, 100], or `None` when
    /// this classifier cannot judge the pose.
    fn score(&self, skeleton: &Skeleton, pose_id: &str) -> Option<f32>;
}

/// Interior angle at `vertex` between rays toward `a` and `c`, degrees
/// in [0, 180]. `None` when either ray has zero length.
#[must_use]
pub fn angle_degrees(a: &Keypoint, vertex: &Keypoint, c: &Keypoint) -> Option<f32> {
    let (vax, vay) = (a.x - vertex.x, a.y - vertex.y);
    let (vcx, vcy) = (c.x - vertex.x, c.y - vertex.y);
    let norm_a = (vax * vax + vay * vay).sqrt();
    let norm_c = (vcx * vcx + vcy * vcy).sqrt();
    if norm_a < f32::EPSILON || norm_c < f32::EPSILON {
        return None;
    }
    let cosine = ((vax * vcx + vay * vcy) / (norm_a * norm_c)).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Score a detected skeleton against a reference pose.
#[must_use]
pub fn evaluate(detected: &Skeleton, reference: &ReferencePose, trimester: Trimester) -> Evaluation {
    if detected.is_empty() || reference.keypoints.is_empty() {
        return Evaluation {
            accuracy: 0.0,
            method: ScoringMethod::Positions,
            angle_scores: Vec::new(),
        };
    }

    let tolerance = trimester.angle_tolerance();
    let mut angle_scores = Vec::with_capacity(reference.angles.len());
    let mut total_score = 0.0f32;
    let mut total_weight = 0.0f32;

    for def in &reference.angles {
        let joints = (
            detected.get(def.first),
            detected.get(def.vertex),
            detected.get(def.second),
        );
        let (Some(a), Some(b), Some(c)) = joints else {
            continue;
        };
        if reference.keypoints.get(def.first).is_none()
            || reference.keypoints.get(def.vertex).is_none()
            || reference.keypoints.get(def.second).is_none()
        {
            continue;
        }

        let measured = angle_degrees(a, b, c);
        let similarity = match measured {
            Some(angle) => (1.0 - (angle - def.expected).abs() / tolerance).max(0.0),
            None => NEUTRAL_SIMILARITY,
        };

        total_score += similarity * def.weight;
        total_weight += def.weight;
        angle_scores.push(AngleScore {
            definition: *def,
            measured,
            similarity,
        });
    }

    if total_weight < MIN_ANGLE_WEIGHT {
        return Evaluation {
            accuracy: evaluate_by_position(detected, &reference.keypoints, trimester),
            method: ScoringMethod::Positions,
            angle_scores: Vec::new(),
        };
    }

    Evaluation {
        accuracy: (total_score / total_weight * 100.0).clamp(0.0, 100.0),
        method: ScoringMethod::Angles,
        angle_scores,
    }
}

/// Positional fallback: weighted mean of per-joint distance similarities.
#[must_use]
pub fn evaluate_by_position(detected: &Skeleton, reference: &Skeleton, trimester: Trimester) -> f32 {
    let tolerance = trimester.position_tolerance();
    let mut total_score = 0.0f32;
    let mut total_weight = 0.0f32;

    for (joint, weight) in POSITION_WEIGHTS {
        let (Some(det), Some(target)) = (detected.get(joint), reference.get(joint)) else {
            continue;
        };
        let similarity = (1.0 - det.distance(target) / tolerance).max(0.0);
        total_score += similarity * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        (total_score / total_weight * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Blend a geometric accuracy with an optional classifier score.
#[must_use]
pub fn blend_with_classifier(geometric: f32, classifier: Option<f32>) -> f32 {
    match classifier {
        Some(score) => {
            ((1.0 - CLASSIFIER_BLEND) * geometric + CLASSIFIER_BLEND * score).clamp(0.0, 100.0)
        }
        None => geometric,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PoseRegistry;

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint::new(x, y, 0.9)
    }

    #[test]
    fn test_angle_straight_line() {
        let angle = angle_degrees(&kp(0.0, 0.0), &kp(0.5, 0.0), &kp(1.0, 0.0)).unwrap();
        assert!((angle - 180.0).abs() < 0.01);
    }

    #[test]
    fn test_angle_right_angle() {
        let angle = angle_degrees(&kp(0.0, 0.0), &kp(0.0, 1.0), &kp(1.0, 1.0)).unwrap();
        assert!((angle - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_angle_degenerate() {
        assert!(angle_degrees(&kp(0.5, 0.5), &kp(0.5, 0.5), &kp(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_empty_skeleton_scores_zero() {
        let registry = PoseRegistry::new();
        let pose = registry.get("1-1");
        let eval = evaluate(&Skeleton::new(), &pose, Trimester::Second);
        assert!(eval.accuracy.abs() < f32::EPSILON);
    }

    #[test]
    fn test_sparse_skeleton_falls_back_to_positions() {
        let registry = PoseRegistry::new();
        let pose = registry.get("1-1");

        // Only head and wrists: no pose angle has all three joints.
        let mut detected = Skeleton::new();
        detected.set(JointName::Nose, kp(0.5, 0.12));
        detected.set(JointName::LeftWrist, kp(0.39, 0.52));
        detected.set(JointName::RightWrist, kp(0.61, 0.52));

        let eval = evaluate(&detected, &pose, Trimester::Second);
        assert_eq!(eval.method, ScoringMethod::Positions);
        assert!(eval.accuracy > 90.0, "exact positions score high");
    }

    #[test]
    fn test_full_skeleton_uses_angles() {
        let registry = PoseRegistry::new();
        let pose = registry.get("1-1");
        let eval = evaluate(&pose.keypoints, &pose, Trimester::Second);
        assert_eq!(eval.method, ScoringMethod::Angles);
        assert_eq!(eval.angle_scores.len(), pose.angles.len());
        for score in &eval.angle_scores {
            assert!((0.0..=1.0).contains(&score.similarity));
        }
    }

    #[test]
    fn test_looser_trimester_scores_higher() {
        let registry = PoseRegistry::new();
        let pose = registry.get("1-1");

        // Shift every joint by a fixed offset to create uniform error.
        let detected: Skeleton = pose
            .keypoints
            .iter()
            .map(|(j, p)| (j, Keypoint::new(p.x + 0.04, p.y + 0.02, 0.9)))
            .collect();

        let strict = evaluate_by_position(&detected, &pose.keypoints, Trimester::First);
        let lenient = evaluate_by_position(&detected, &pose.keypoints, Trimester::Third);
        assert!(lenient > strict);
    }

    #[test]
    fn test_identical_positions_score_perfect() {
        let registry = PoseRegistry::new();
        let pose = registry.get("3-2");
        let score = evaluate_by_position(&pose.keypoints, &pose.keypoints, Trimester::First);
        assert!((score - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_no_joint_overlap_scores_zero() {
        let mut detected = Skeleton::new();
        detected.set(JointName::LeftEye, kp(0.5, 0.5));
        let registry = PoseRegistry::new();
        let pose = registry.get("1-1");
        let score = evaluate_by_position(&detected, &pose.keypoints, Trimester::Second);
        assert!(score.abs() < f32::EPSILON);
    }

    #[test]
    fn test_classifier_blend() {
        assert!((blend_with_classifier(80.0, Some(40.0)) - 68.0).abs() < 0.01);
        assert!((blend_with_classifier(80.0, None) - 80.0).abs() < f32::EPSILON);
        assert!(blend_with_classifier(120.0, Some(120.0)) <= 100.0);
    }
}
