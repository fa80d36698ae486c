//! Authoring data for the prenatal pose curriculum.
//!
//! Each pose carries a canonical skeleton in the unit square together with
//! the joint angles that define the posture. Ids follow the curriculum's
//! `trimester-lesson` scheme, `"1-1"` through `"3-3"`.

use crate::registry::{AngleDefinition, ReferencePose, Trimester};
use crate::skeleton::{JointName, Keypoint, Skeleton};

pub(crate) const POSE_IDS: &[&str] = &[
    "1-1", "1-2", "1-3", "2-1", "2-2", "2-3", "3-1", "3-2", "3-3",
];

pub(crate) const DEFAULT_POSE_ID: &str = "1-1";

/// Map an id to its static canonical form, if known.
pub(crate) fn canonical_id(pose_id: &str) -> Option<&'static str> {
    POSE_IDS.iter().find(|&&id| id == pose_id).copied()
}

/// Build the reference pose for a canonical id.
///
/// Panics only if called with an id not in [`POSE_IDS`]; the registry
/// canonicalizes ids before calling.
pub(crate) fn build(pose_id: &'static str) -> ReferencePose {
    match pose_id {
        "1-1" => mountain(),
        "1-2" => cat_cow(),
        "1-3" => seated_side_stretch(),
        "2-1" => warrior_ii(),
        "2-2" => wide_legged_forward_fold(),
        "2-3" => triangle(),
        "3-1" => modified_squat(),
        "3-2" => seated_butterfly(),
        "3-3" => side_lying(),
        other => unreachable!("pose id '{other}' not canonicalized"),
    }
}

fn skeleton(points: [(JointName, f32, f32); 17]) -> Skeleton {
    points
        .iter()
        .map(|&(joint, x, y)| (joint, Keypoint::new(x, y, 1.0)))
        .collect()
}

fn mountain() -> ReferencePose {
    use JointName::*;
    ReferencePose {
        id: "1-1",
        title: "Mountain Pose (Tadasana)",
        description: "Stand tall with feet hip-width apart, arms at sides. \
                      Draw shoulders back and down, engage core gently.",
        trimester: Trimester::First,
        keypoints: skeleton([
            (Nose, 0.5, 0.12),
            (LeftEye, 0.48, 0.11),
            (RightEye, 0.52, 0.11),
            (LeftEar, 0.46, 0.12),
            (RightEar, 0.54, 0.12),
            (LeftShoulder, 0.45, 0.22),
            (RightShoulder, 0.55, 0.22),
            (LeftElbow, 0.42, 0.38),
            (RightElbow, 0.58, 0.38),
            (LeftWrist, 0.39, 0.52),
            (RightWrist, 0.61, 0.52),
            (LeftHip, 0.47, 0.55),
            (RightHip, 0.53, 0.55),
            (LeftKnee, 0.47, 0.75),
            (RightKnee, 0.53, 0.75),
            (LeftAnkle, 0.47, 0.95),
            (RightAnkle, 0.53, 0.95),
        ]),
        angles: vec![
            AngleDefinition::new(LeftShoulder, LeftHip, LeftKnee, 170.0, 1.5),
            AngleDefinition::new(RightShoulder, RightHip, RightKnee, 170.0, 1.5),
            AngleDefinition::new(LeftShoulder, LeftElbow, LeftWrist, 160.0, 1.0),
            AngleDefinition::new(RightShoulder, RightElbow, RightWrist, 160.0, 1.0),
            AngleDefinition::new(LeftHip, LeftKnee, LeftAnkle, 170.0, 1.5),
            AngleDefinition::new(RightHip, RightKnee, RightAnkle, 170.0, 1.5),
        ],
    }
}

fn cat_cow() -> ReferencePose {
    use JointName::*;
    ReferencePose {
        id: "1-2",
        title: "Cat-Cow Stretch",
        description: "Start on hands and knees. Alternate between arching \
                      back (cow) and rounding spine (cat).",
        trimester: Trimester::First,
        // Canonical skeleton is the cat phase with the spine rounded.
        keypoints: skeleton([
            (Nose, 0.5, 0.55),
            (LeftEye, 0.48, 0.54),
            (RightEye, 0.52, 0.54),
            (LeftEar, 0.46, 0.55),
            (RightEar, 0.54, 0.55),
            (LeftShoulder, 0.38, 0.40),
            (RightShoulder, 0.62, 0.40),
            (LeftElbow, 0.25, 0.50),
            (RightElbow, 0.75, 0.50),
            (LeftWrist, 0.18, 0.65),
            (RightWrist, 0.82, 0.65),
            (LeftHip, 0.40, 0.43),
            (RightHip, 0.60, 0.43),
            (LeftKnee, 0.30, 0.70),
            (RightKnee, 0.70, 0.70),
            (LeftAnkle, 0.30, 0.85),
            (RightAnkle, 0.70, 0.85),
        ]),
        angles: vec![
            AngleDefinition::new(LeftShoulder, LeftHip, LeftKnee, 120.0, 1.5),
            AngleDefinition::new(RightShoulder, RightHip, RightKnee, 120.0, 1.5),
            AngleDefinition::new(LeftShoulder, LeftElbow, LeftWrist, 170.0, 1.0),
            AngleDefinition::new(RightShoulder, RightElbow, RightWrist, 170.0, 1.0),
        ],
    }
}

fn seated_side_stretch() -> ReferencePose {
    use JointName::*;
    ReferencePose {
        id: "1-3",
        title: "Seated Side Stretch",
        description: "Sit cross-legged, reach one arm overhead and lean to \
                      opposite side. Hold and repeat on other side.",
        trimester: Trimester::First,
        keypoints: skeleton([
            (Nose, 0.60, 0.30),
            (LeftEye, 0.59, 0.29),
            (RightEye, 0.61, 0.29),
            (LeftEar, 0.58, 0.30),
            (RightEar, 0.62, 0.30),
            (LeftShoulder, 0.55, 0.40),
            (RightShoulder, 0.65, 0.38),
            (LeftElbow, 0.50, 0.25),
            (RightElbow, 0.75, 0.30),
            (LeftWrist, 0.40, 0.15),
            (RightWrist, 0.85, 0.25),
            (LeftHip, 0.45, 0.65),
            (RightHip, 0.55, 0.65),
            (LeftKnee, 0.35, 0.70),
            (RightKnee, 0.65, 0.75),
            (LeftAnkle, 0.40, 0.80),
            (RightAnkle, 0.70, 0.85),
        ]),
        angles: vec![
            AngleDefinition::new(RightShoulder, RightHip, RightKnee, 90.0, 1.5),
            AngleDefinition::new(LeftShoulder, LeftElbow, LeftWrist, 90.0, 1.0),
            AngleDefinition::new(RightShoulder, RightElbow, RightWrist, 160.0, 1.5),
            AngleDefinition::new(LeftHip, LeftKnee, LeftAnkle, 110.0, 1.0),
        ],
    }
}

fn warrior_ii() -> ReferencePose {
    use JointName::*;
    ReferencePose {
        id: "2-1",
        title: "Warrior II (Virabhadrasana II)",
        description: "Step feet wide apart, turn one foot out. Bend knee \
                      over ankle, extend arms and gaze over front hand.",
        trimester: Trimester::Second,
        keypoints: skeleton([
            (Nose, 0.5, 0.15),
            (LeftEye, 0.48, 0.14),
            (RightEye, 0.52, 0.14),
            (LeftEar, 0.46, 0.15),
            (RightEar, 0.54, 0.15),
            (LeftShoulder, 0.35, 0.25),
            (RightShoulder, 0.65, 0.25),
            (LeftElbow, 0.20, 0.25),
            (RightElbow, 0.80, 0.25),
            (LeftWrist, 0.05, 0.25),
            (RightWrist, 0.95, 0.25),
            (LeftHip, 0.40, 0.55),
            (RightHip, 0.60, 0.55),
            (LeftKnee, 0.25, 0.75),
            (RightKnee, 0.70, 0.75),
            (LeftAnkle, 0.15, 0.92),
            (RightAnkle, 0.80, 0.92),
        ]),
        angles: vec![
            AngleDefinition::new(LeftHip, LeftKnee, LeftAnkle, 100.0, 2.0),
            AngleDefinition::new(RightHip, RightKnee, RightAnkle, 170.0, 1.5),
            AngleDefinition::new(LeftShoulder, LeftElbow, LeftWrist, 170.0, 1.0),
            AngleDefinition::new(RightShoulder, RightElbow, RightWrist, 170.0, 1.0),
            AngleDefinition::new(RightHip, LeftHip, LeftKnee, 120.0, 1.5),
        ],
    }
}

fn wide_legged_forward_fold() -> ReferencePose {
    use JointName::*;
    ReferencePose {
        id: "2-2",
        title: "Wide-Legged Forward Fold (Prasarita Padottanasana)",
        description: "Step feet wide apart, fold forward from hips. Rest \
                      hands on floor or blocks if needed.",
        trimester: Trimester::Second,
        keypoints: skeleton([
            (Nose, 0.5, 0.60),
            (LeftEye, 0.48, 0.59),
            (RightEye, 0.52, 0.59),
            (LeftEar, 0.46, 0.60),
            (RightEar, 0.54, 0.60),
            (LeftShoulder, 0.45, 0.50),
            (RightShoulder, 0.55, 0.50),
            (LeftElbow, 0.45, 0.65),
            (RightElbow, 0.55, 0.65),
            (LeftWrist, 0.45, 0.80),
            (RightWrist, 0.55, 0.80),
            (LeftHip, 0.35, 0.40),
            (RightHip, 0.65, 0.40),
            (LeftKnee, 0.20, 0.65),
            (RightKnee, 0.80, 0.65),
            (LeftAnkle, 0.20, 0.90),
            (RightAnkle, 0.80, 0.90),
        ]),
        angles: vec![
            AngleDefinition::new(LeftShoulder, LeftHip, LeftKnee, 45.0, 1.5),
            AngleDefinition::new(RightShoulder, RightHip, RightKnee, 45.0, 1.5),
            AngleDefinition::new(LeftHip, LeftKnee, LeftAnkle, 170.0, 1.0),
            AngleDefinition::new(RightHip, RightKnee, RightAnkle, 170.0, 1.0),
        ],
    }
}

fn triangle() -> ReferencePose {
    use JointName::*;
    ReferencePose {
        id: "2-3",
        title: "Supported Triangle Pose (Utthita Trikonasana)",
        description: "Step feet wide apart, extend one arm down to \
                      shin/block/floor and the other arm up.",
        trimester: Trimester::Second,
        keypoints: skeleton([
            (Nose, 0.40, 0.30),
            (LeftEye, 0.39, 0.29),
            (RightEye, 0.41, 0.29),
            (LeftEar, 0.38, 0.30),
            (RightEar, 0.42, 0.30),
            (LeftShoulder, 0.45, 0.40),
            (RightShoulder, 0.55, 0.20),
            (LeftElbow, 0.35, 0.60),
            (RightElbow, 0.65, 0.15),
            (LeftWrist, 0.25, 0.75),
            (RightWrist, 0.75, 0.10),
            (LeftHip, 0.40, 0.55),
            (RightHip, 0.60, 0.55),
            (LeftKnee, 0.25, 0.75),
            (RightKnee, 0.75, 0.75),
            (LeftAnkle, 0.20, 0.92),
            (RightAnkle, 0.85, 0.92),
        ]),
        angles: vec![
            AngleDefinition::new(RightShoulder, RightHip, RightKnee, 120.0, 1.5),
            AngleDefinition::new(LeftShoulder, LeftElbow, LeftWrist, 160.0, 1.0),
            AngleDefinition::new(RightShoulder, RightElbow, RightWrist, 160.0, 1.0),
            AngleDefinition::new(LeftHip, LeftKnee, LeftAnkle, 170.0, 1.0),
            AngleDefinition::new(RightHip, RightKnee, RightAnkle, 170.0, 1.0),
        ],
    }
}

fn modified_squat() -> ReferencePose {
    use JointName::*;
    ReferencePose {
        id: "3-1",
        title: "Modified Squat (Malasana Variation)",
        description: "Stand with feet wider than hips, lower into squat. \
                      Use wall or chair for support if needed.",
        trimester: Trimester::Third,
        keypoints: skeleton([
            (Nose, 0.5, 0.45),
            (LeftEye, 0.48, 0.44),
            (RightEye, 0.52, 0.44),
            (LeftEar, 0.46, 0.45),
            (RightEar, 0.54, 0.45),
            (LeftShoulder, 0.40, 0.50),
            (RightShoulder, 0.60, 0.50),
            (LeftElbow, 0.30, 0.65),
            (RightElbow, 0.70, 0.65),
            (LeftWrist, 0.25, 0.75),
            (RightWrist, 0.75, 0.75),
            (LeftHip, 0.35, 0.70),
            (RightHip, 0.65, 0.70),
            (LeftKnee, 0.30, 0.85),
            (RightKnee, 0.70, 0.85),
            (LeftAnkle, 0.35, 0.98),
            (RightAnkle, 0.65, 0.98),
        ]),
        angles: vec![
            AngleDefinition::new(LeftShoulder, LeftHip, LeftKnee, 90.0, 1.0),
            AngleDefinition::new(RightShoulder, RightHip, RightKnee, 90.0, 1.0),
            AngleDefinition::new(LeftHip, LeftKnee, LeftAnkle, 80.0, 2.0),
            AngleDefinition::new(RightHip, RightKnee, RightAnkle, 80.0, 2.0),
        ],
    }
}

fn seated_butterfly() -> ReferencePose {
    use JointName::*;
    ReferencePose {
        id: "3-2",
        title: "Seated Butterfly (Baddha Konasana)",
        description: "Sit with soles of feet together, knees out to sides. \
                      Sit on blanket for support if needed.",
        trimester: Trimester::Third,
        keypoints: skeleton([
            (Nose, 0.5, 0.25),
            (LeftEye, 0.48, 0.24),
            (RightEye, 0.52, 0.24),
            (LeftEar, 0.46, 0.25),
            (RightEar, 0.54, 0.25),
            (LeftShoulder, 0.40, 0.35),
            (RightShoulder, 0.60, 0.35),
            (LeftElbow, 0.30, 0.50),
            (RightElbow, 0.70, 0.50),
            (LeftWrist, 0.35, 0.65),
            (RightWrist, 0.65, 0.65),
            (LeftHip, 0.40, 0.65),
            (RightHip, 0.60, 0.65),
            (LeftKnee, 0.30, 0.60),
            (RightKnee, 0.70, 0.60),
            (LeftAnkle, 0.45, 0.75),
            (RightAnkle, 0.55, 0.75),
        ]),
        angles: vec![
            AngleDefinition::new(LeftShoulder, LeftHip, LeftKnee, 80.0, 1.0),
            AngleDefinition::new(RightShoulder, RightHip, RightKnee, 80.0, 1.0),
            AngleDefinition::new(LeftHip, LeftKnee, LeftAnkle, 45.0, 1.5),
            AngleDefinition::new(RightHip, RightKnee, RightAnkle, 45.0, 1.5),
        ],
    }
}

fn side_lying() -> ReferencePose {
    use JointName::*;
    ReferencePose {
        id: "3-3",
        title: "Side-Lying Relaxation",
        description: "Lie on left side with pillows supporting head, belly, \
                      and between knees.",
        trimester: Trimester::Third,
        keypoints: skeleton([
            (Nose, 0.25, 0.30),
            (LeftEye, 0.25, 0.28),
            (RightEye, 0.26, 0.28),
            (LeftEar, 0.24, 0.30),
            (RightEar, 0.27, 0.30),
            (LeftShoulder, 0.30, 0.40),
            (RightShoulder, 0.35, 0.40),
            (LeftElbow, 0.25, 0.50),
            (RightElbow, 0.40, 0.50),
            (LeftWrist, 0.20, 0.55),
            (RightWrist, 0.45, 0.55),
            (LeftHip, 0.40, 0.60),
            (RightHip, 0.45, 0.60),
            (LeftKnee, 0.50, 0.70),
            (RightKnee, 0.55, 0.70),
            (LeftAnkle, 0.60, 0.80),
            (RightAnkle, 0.65, 0.80),
        ]),
        angles: vec![
            AngleDefinition::new(LeftShoulder, LeftHip, LeftKnee, 100.0, 1.0),
            AngleDefinition::new(LeftHip, LeftKnee, LeftAnkle, 130.0, 1.0),
            AngleDefinition::new(RightHip, RightKnee, RightAnkle, 130.0, 1.0),
        ],
    }
}
