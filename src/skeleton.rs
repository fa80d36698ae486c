//! Skeleton data model: named body joints, keypoints, and full-body poses.
//!
//! All coordinates are normalized to the unit square of the source image
//! (origin top-left), independent of resolution. A [`Skeleton`] holds at most
//! one [`Keypoint`] per [`JointName`] and may be partial when joints are
//! occluded or detected below the confidence floor.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The 17 body joints of the MoveNet / COCO keypoint layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum JointName {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl JointName {
    /// Number of joints.
    pub const COUNT: usize = 17;

    /// All joints in detector output order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Joint at a given detector output index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Detector output index of this joint.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wire name, e.g. `left_shoulder`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    /// Parse a wire name back into a joint.
    #[must_use]
    pub fn from_str_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|j| j.as_str() == name)
    }

    #[must_use]
    pub const fn is_knee(self) -> bool {
        matches!(self, Self::LeftKnee | Self::RightKnee)
    }

    #[must_use]
    pub const fn is_elbow(self) -> bool {
        matches!(self, Self::LeftElbow | Self::RightElbow)
    }

    #[must_use]
    pub const fn is_hip(self) -> bool {
        matches!(self, Self::LeftHip | Self::RightHip)
    }

    /// Human-readable form for coaching text, e.g. "left shoulder".
    #[must_use]
    pub fn readable(self) -> String {
        match self {
            Self::Nose => "head".to_string(),
            other => other.as_str().replace('_', " "),
        }
    }
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joint pairs forming the skeleton for overlay rendering by clients.
pub const CONNECTIONS: [(JointName, JointName); 16] = [
    (JointName::Nose, JointName::LeftEye),
    (JointName::Nose, JointName::RightEye),
    (JointName::LeftEye, JointName::LeftEar),
    (JointName::RightEye, JointName::RightEar),
    (JointName::LeftShoulder, JointName::RightShoulder),
    (JointName::LeftShoulder, JointName::LeftElbow),
    (JointName::RightShoulder, JointName::RightElbow),
    (JointName::LeftElbow, JointName::LeftWrist),
    (JointName::RightElbow, JointName::RightWrist),
    (JointName::LeftShoulder, JointName::LeftHip),
    (JointName::RightShoulder, JointName::RightHip),
    (JointName::LeftHip, JointName::RightHip),
    (JointName::LeftHip, JointName::LeftKnee),
    (JointName::RightHip, JointName::RightKnee),
    (JointName::LeftKnee, JointName::LeftAnkle),
    (JointName::RightKnee, JointName::RightAnkle),
];

/// One detected or reference joint: normalized position plus confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// Normalized X coordinate in [0, 1].
    pub x: f32,
    /// Normalized Y coordinate in [0, 1].
    pub y: f32,
    /// Detection confidence in [0, 1].
    pub confidence: f32,
}

impl Keypoint {
    #[must_use]
    pub const fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// Euclidean distance to another keypoint in normalized units.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A full-body pose for one frame: at most one keypoint per joint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    joints: [Option<Keypoint>; JointName::COUNT],
}

impl Skeleton {
    /// Empty skeleton with no joints.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            joints: [None; JointName::COUNT],
        }
    }

    /// Keypoint for a joint, if present.
    #[must_use]
    pub fn get(&self, joint: JointName) -> Option<&Keypoint> {
        self.joints[joint.index()].as_ref()
    }

    /// Insert or replace a joint's keypoint.
    pub fn set(&mut self, joint: JointName, keypoint: Keypoint) {
        self.joints[joint.index()] = Some(keypoint);
    }

    /// Remove a joint's keypoint.
    pub fn clear(&mut self, joint: JointName) {
        self.joints[joint.index()] = None;
    }

    /// Iterate present joints in detector order.
    pub fn iter(&self) -> impl Iterator<Item = (JointName, &Keypoint)> {
        JointName::ALL
            .iter()
            .filter_map(|&j| self.joints[j.index()].as_ref().map(|kp| (j, kp)))
    }

    /// Number of joints present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.iter().filter(|j| j.is_some()).count()
    }

    /// Whether no joints are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.iter().all(std::option::Option::is_none)
    }

    /// Mean confidence over present joints, or 0 when empty.
    #[must_use]
    pub fn average_confidence(&self) -> f32 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for kp in self.joints.iter().flatten() {
            sum += kp.confidence;
            count += 1;
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }
}

impl FromIterator<(JointName, Keypoint)> for Skeleton {
    fn from_iter<T: IntoIterator<Item = (JointName, Keypoint)>>(iter: T) -> Self {
        let mut skeleton = Self::new();
        for (joint, kp) in iter {
            skeleton.set(joint, kp);
        }
        skeleton
    }
}

/// Wire record for one keypoint, matching the shape mobile clients consume:
/// `{"part": "left_knee", "position": {"x": 0.4, "y": 0.7}, "score": 0.9}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeypointRecord {
    part: String,
    position: Position,
    score: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Position {
    x: f32,
    y: f32,
}

impl Serialize for Skeleton {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let records: Vec<KeypointRecord> = self
            .iter()
            .map(|(joint, kp)| KeypointRecord {
                part: joint.as_str().to_string(),
                position: Position { x: kp.x, y: kp.y },
                score: kp.confidence,
            })
            .collect();
        records.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Skeleton {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let records = Vec::<KeypointRecord>::deserialize(deserializer)?;
        let mut skeleton = Self::new();
        for record in records {
            let joint = JointName::from_str_name(&record.part)
                .ok_or_else(|| D::Error::custom(format!("unknown joint: {}", record.part)))?;
            skeleton.set(
                joint,
                Keypoint::new(record.position.x, record.position.y, record.score),
            );
        }
        Ok(skeleton)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_count_and_roundtrip() {
        assert_eq!(JointName::COUNT, 17);
        for (i, joint) in JointName::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
            assert_eq!(JointName::from_index(i), Some(*joint));
            assert_eq!(JointName::from_str_name(joint.as_str()), Some(*joint));
        }
        assert_eq!(JointName::from_index(17), None);
        assert_eq!(JointName::from_str_name("tail"), None);
    }

    #[test]
    fn test_readable_names() {
        assert_eq!(JointName::Nose.readable(), "head");
        assert_eq!(JointName::LeftShoulder.readable(), "left shoulder");
    }

    #[test]
    fn test_skeleton_set_get() {
        let mut skeleton = Skeleton::new();
        assert!(skeleton.is_empty());

        skeleton.set(JointName::Nose, Keypoint::new(0.5, 0.1, 0.9));
        assert_eq!(skeleton.len(), 1);
        let nose = skeleton.get(JointName::Nose).unwrap();
        assert!((nose.x - 0.5).abs() < f32::EPSILON);
        assert!(skeleton.get(JointName::LeftHip).is_none());
    }

    #[test]
    fn test_average_confidence() {
        let mut skeleton = Skeleton::new();
        skeleton.set(JointName::Nose, Keypoint::new(0.5, 0.1, 0.4));
        skeleton.set(JointName::LeftHip, Keypoint::new(0.4, 0.5, 0.8));
        assert!((skeleton.average_confidence() - 0.6).abs() < 1e-6);
        assert!((Skeleton::new().average_confidence()).abs() < f32::EPSILON);
    }

    #[test]
    fn test_keypoint_distance() {
        let a = Keypoint::new(0.0, 0.0, 1.0);
        let b = Keypoint::new(0.3, 0.4, 1.0);
        assert!((a.distance(&b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_serde_wire_shape() {
        let mut skeleton = Skeleton::new();
        skeleton.set(JointName::LeftKnee, Keypoint::new(0.25, 0.75, 0.5));

        let json = serde_json::to_value(&skeleton).unwrap();
        assert_eq!(json[0]["part"], "left_knee");
        assert_eq!(json[0]["position"]["x"], 0.25);
        assert_eq!(json[0]["score"], 0.5);

        let back: Skeleton = serde_json::from_value(json).unwrap();
        assert_eq!(back, skeleton);
    }

    #[test]
    fn test_connections_reference_valid_joints() {
        // Every joint except eyes/ears appears in at least one limb connection.
        assert_eq!(CONNECTIONS.len(), 16);
        assert!(CONNECTIONS
            .iter()
            .any(|&(a, b)| a == JointName::LeftHip && b == JointName::LeftKnee));
    }
}
