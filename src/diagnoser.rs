//! Corrective issue diagnosis.
//!
//! Turns per-angle deviations and a handful of structural rules into at
//! most three human-readable corrections, ranked by severity. The list is
//! never empty: with nothing to correct the practitioner gets a holding
//! encouragement instead.

use crate::evaluator::angle_degrees;
use crate::registry::ReferencePose;
use crate::skeleton::{JointName, Skeleton};

/// Angle deviation (degrees) above which a correction is raised.
const ANGLE_ISSUE_THRESHOLD: f32 = 25.0;

/// Band for left/right symmetry checks, normalized units.
const SYMMETRY_BAND: f32 = 0.05;

/// Band for knee-over-ankle and arm-height checks, normalized units.
const ALIGNMENT_BAND: f32 = 0.10;

/// Distance from an image edge considered "at the edge".
const FRAME_MARGIN: f32 = 0.05;

/// Maximum issues reported per frame.
pub const MAX_ISSUES: usize = 3;

/// One ranked correction.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub description: String,
    pub severity: f32,
}

impl Issue {
    fn new(description: impl Into<String>, severity: f32) -> Self {
        Self {
            description: description.into(),
            severity,
        }
    }
}

/// Diagnose a detected skeleton against its reference pose.
///
/// Returns 1 to [`MAX_ISSUES`] issues in non-increasing severity order.
#[must_use]
pub fn diagnose(detected: &Skeleton, reference: &ReferencePose) -> Vec<Issue> {
    let mut issues = angle_issues(detected, reference);
    issues.sort_by(|a, b| b.severity.total_cmp(&a.severity));
    issues.truncate(MAX_ISSUES);

    structural_issues(detected, reference, &mut issues);
    framing_issue(detected, &mut issues);

    if issues.is_empty() {
        issues.push(Issue::new(
            format!("Continue holding {} with steady breath", reference.title),
            0.0,
        ));
    }

    issues.truncate(MAX_ISSUES);
    issues
}

fn angle_issues(detected: &Skeleton, reference: &ReferencePose) -> Vec<Issue> {
    let mut issues = Vec::new();

    for def in &reference.angles {
        let (Some(a), Some(b), Some(c)) = (
            detected.get(def.first),
            detected.get(def.vertex),
            detected.get(def.second),
        ) else {
            continue;
        };
        let Some(measured) = angle_degrees(a, b, c) else {
            continue;
        };

        let deviation = (measured - def.expected).abs();
        if deviation <= ANGLE_ISSUE_THRESHOLD {
            continue;
        }

        let description = direction_message(def.first, def.vertex, def.second, measured, def.expected);
        issues.push(Issue::new(description, deviation * def.weight));
    }

    issues
}

/// Phrase a correction by vertex joint type and deviation direction.
fn direction_message(
    first: JointName,
    vertex: JointName,
    second: JointName,
    measured: f32,
    expected: f32,
) -> String {
    let vertex_name = vertex.readable();
    let too_closed = measured < expected;

    if vertex.is_knee() || vertex.is_elbow() {
        if too_closed {
            format!("Bend your {vertex_name} more")
        } else {
            format!("Straighten your {vertex_name} more")
        }
    } else if vertex.is_hip() {
        // An open hip target reads as an alignment cue, a closed one as a
        // fold cue, whichever direction the error runs.
        if too_closed {
            if expected > 160.0 {
                format!("Straighten your {vertex_name} to {} alignment", second.readable())
            } else {
                format!("Bend more at the {vertex_name}")
            }
        } else if expected < 100.0 {
            format!("Bend more at the {vertex_name}")
        } else {
            format!("Straighten your {vertex_name} to {} alignment", second.readable())
        }
    } else {
        format!(
            "Adjust the angle between {}, {vertex_name}, and {}",
            first.readable(),
            second.readable()
        )
    }
}

/// Pose-specific structural rules, appended after the ranked angle issues.
fn structural_issues(detected: &Skeleton, reference: &ReferencePose, issues: &mut Vec<Issue>) {
    match reference.id {
        "1-1" => {
            if let (Some(l), Some(r)) = (
                detected.get(JointName::LeftShoulder),
                detected.get(JointName::RightShoulder),
            ) {
                if (l.y - r.y).abs() > SYMMETRY_BAND {
                    issues.push(Issue::new("Level your shoulders", 0.0));
                }
            }
            if let (Some(l), Some(r)) = (
                detected.get(JointName::LeftHip),
                detected.get(JointName::RightHip),
            ) {
                if (l.y - r.y).abs() > SYMMETRY_BAND {
                    issues.push(Issue::new("Level your hips", 0.0));
                }
            }
        }
        "2-1" => {
            if let (Some(knee), Some(ankle)) = (
                detected.get(JointName::LeftKnee),
                detected.get(JointName::LeftAnkle),
            ) {
                if (knee.x - ankle.x).abs() > ALIGNMENT_BAND {
                    issues.push(Issue::new("Align front knee over ankle", 0.0));
                }
            }
            if let (Some(ls), Some(lw), Some(rw)) = (
                detected.get(JointName::LeftShoulder),
                detected.get(JointName::LeftWrist),
                detected.get(JointName::RightWrist),
            ) {
                if (lw.y - ls.y).abs() > ALIGNMENT_BAND || (rw.y - ls.y).abs() > ALIGNMENT_BAND {
                    issues.push(Issue::new("Extend your arms at shoulder height", 0.0));
                }
            }
        }
        _ => {}
    }
}

/// Flag the frame when more than one extremity sits on an image edge.
fn framing_issue(detected: &Skeleton, issues: &mut Vec<Issue>) {
    const EXTREMITIES: [JointName; 5] = [
        JointName::Nose,
        JointName::LeftAnkle,
        JointName::RightAnkle,
        JointName::LeftWrist,
        JointName::RightWrist,
    ];

    let near_edge = EXTREMITIES
        .iter()
        .filter_map(|&joint| detected.get(joint))
        .filter(|kp| {
            kp.x < FRAME_MARGIN
                || kp.x > 1.0 - FRAME_MARGIN
                || kp.y < FRAME_MARGIN
                || kp.y > 1.0 - FRAME_MARGIN
        })
        .count();

    if near_edge > 1 {
        issues.push(Issue::new("Position your full body in the camera frame", 0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PoseRegistry;
    use crate::skeleton::Keypoint;

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint::new(x, y, 0.9)
    }

    #[test]
    fn test_never_empty_and_bounded() {
        let registry = PoseRegistry::new();
        let pose = registry.get("3-3");
        let issues = diagnose(&Skeleton::new(), &pose);
        assert!(!issues.is_empty());
        assert!(issues.len() <= MAX_ISSUES);
        assert!(issues[0].description.contains("Side-Lying Relaxation"));
    }

    #[test]
    fn test_severity_non_increasing() {
        let registry = PoseRegistry::new();
        let pose = registry.get("2-1");
        // The canonical layout deviates from several targets, producing
        // multiple ranked angle issues.
        let issues = diagnose(&pose.keypoints, &pose);
        assert!(!issues.is_empty());
        for pair in issues.windows(2) {
            assert!(pair[0].severity >= pair[1].severity);
        }
    }

    #[test]
    fn test_bent_elbow_flagged_first() {
        let registry = PoseRegistry::new();
        let pose = registry.get("1-1");

        // Right elbow at 90 degrees against a 160 degree target, all other
        // joints on a straight vertical line so no other angle can compete.
        let mut detected = Skeleton::new();
        detected.set(JointName::RightShoulder, kp(0.5, 0.2));
        detected.set(JointName::RightElbow, kp(0.5, 0.4));
        detected.set(JointName::RightWrist, kp(0.7, 0.4));

        let issues = diagnose(&detected, &pose);
        assert_eq!(issues[0].description, "Straighten your right elbow more");
        assert!((issues[0].severity - 70.0).abs() < 0.5);
    }

    #[test]
    fn test_mountain_symmetry_checks() {
        let registry = PoseRegistry::new();
        let pose = registry.get("1-1");

        let mut detected: Skeleton = pose.keypoints.clone();
        let shoulder = *detected.get(JointName::LeftShoulder).unwrap();
        detected.set(
            JointName::LeftShoulder,
            kp(shoulder.x, shoulder.y + 0.08),
        );

        let issues = diagnose(&detected, &pose);
        assert!(issues.iter().any(|i| i.description == "Level your shoulders"));
    }

    #[test]
    fn test_framing_check() {
        let registry = PoseRegistry::new();
        let pose = registry.get("1-1");

        let mut detected = pose.keypoints.clone();
        detected.set(JointName::LeftWrist, kp(0.01, 0.5));
        detected.set(JointName::RightWrist, kp(0.99, 0.5));

        let issues = diagnose(&detected, &pose);
        assert!(issues
            .iter()
            .any(|i| i.description == "Position your full body in the camera frame"));
    }

    #[test]
    fn test_single_edge_point_not_flagged() {
        let registry = PoseRegistry::new();
        let pose = registry.get("3-2");

        let mut detected = pose.keypoints.clone();
        detected.set(JointName::Nose, kp(0.5, 0.02));

        let issues = diagnose(&detected, &pose);
        assert!(!issues
            .iter()
            .any(|i| i.description == "Position your full body in the camera frame"));
    }
}
