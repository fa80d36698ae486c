//! Reference pose registry.
//!
//! Reference poses are authored as canonical skeletons plus the joint-angle
//! targets that define each posture. Construction is deferred until a pose
//! is first requested, then the built pose is cached behind an `Arc` so
//! concurrent sessions share one copy.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::poses;
use crate::skeleton::{JointName, Skeleton};
use crate::warn;

/// Pregnancy trimester, which sets how forgiving scoring is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trimester {
    First,
    Second,
    Third,
}

impl Trimester {
    /// Angle deviation (degrees) at which an angle's score reaches zero.
    #[must_use]
    pub const fn angle_tolerance(self) -> f32 {
        match self {
            Self::First => 25.0,
            Self::Second => 30.0,
            Self::Third => 35.0,
        }
    }

    /// Normalized distance at which a joint's position score reaches zero.
    #[must_use]
    pub const fn position_tolerance(self) -> f32 {
        match self {
            Self::First => 0.15,
            Self::Second => 0.20,
            Self::Third => 0.25,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
        }
    }

    /// Parse a trimester name, defaulting to second on unknown input.
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "first" | "1" => Self::First,
            "third" | "3" => Self::Third,
            _ => Self::Second,
        }
    }
}

impl std::fmt::Display for Trimester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One scored joint angle: the angle at `vertex` between rays toward
/// `first` and `second`, compared against `expected` degrees.
#[derive(Debug, Clone, Copy)]
pub struct AngleDefinition {
    pub first: JointName,
    pub vertex: JointName,
    pub second: JointName,
    /// Target angle in degrees.
    pub expected: f32,
    /// Relative importance when aggregating the score.
    pub weight: f32,
}

impl AngleDefinition {
    #[must_use]
    pub const fn new(
        first: JointName,
        vertex: JointName,
        second: JointName,
        expected: f32,
        weight: f32,
    ) -> Self {
        Self {
            first,
            vertex,
            second,
            expected,
            weight,
        }
    }

    /// Total weight across a set of definitions.
    #[must_use]
    pub fn total_weight(definitions: &[Self]) -> f32 {
        definitions.iter().map(|d| d.weight).sum()
    }
}

/// A fully built reference pose.
#[derive(Debug, Clone)]
pub struct ReferencePose {
    /// Curriculum identifier, e.g. `"2-1"`.
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub trimester: Trimester,
    /// Canonical joint layout in the unit square, all scores 1.0.
    pub keypoints: Skeleton,
    /// Angle targets defining the posture. May be empty, in which case
    /// scoring falls back to positional comparison.
    pub angles: Vec<AngleDefinition>,
}

/// Lazily built, shared cache of reference poses.
#[derive(Debug, Default)]
pub struct PoseRegistry {
    cache: RwLock<HashMap<&'static str, Arc<ReferencePose>>>,
}

impl PoseRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All pose ids this registry can serve.
    #[must_use]
    pub const fn known_ids() -> &'static [&'static str] {
        poses::POSE_IDS
    }

    /// Fetch a reference pose, building and caching it on first use.
    ///
    /// An unknown id logs a warning and resolves to Mountain Pose so a
    /// session with a stale or mistyped id still gets coherent coaching.
    pub fn get(&self, pose_id: &str) -> Arc<ReferencePose> {
        let canonical = match poses::canonical_id(pose_id) {
            Some(id) => id,
            None => {
                warn!("Unknown pose id '{pose_id}', using '{}'", poses::DEFAULT_POSE_ID);
                poses::DEFAULT_POSE_ID
            }
        };

        if let Ok(cache) = self.cache.read() {
            if let Some(pose) = cache.get(canonical) {
                return Arc::clone(pose);
            }
        }

        let mut cache = match self.cache.write() {
            Ok(guard) => guard,
            // Poisoned cache: build without caching rather than fail.
            Err(_) => return Arc::new(poses::build(canonical)),
        };
        Arc::clone(
            cache
                .entry(canonical)
                .or_insert_with(|| Arc::new(poses::build(canonical))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimester_tolerances_widen() {
        assert!(Trimester::First.angle_tolerance() < Trimester::Second.angle_tolerance());
        assert!(Trimester::Second.angle_tolerance() < Trimester::Third.angle_tolerance());
        assert!(Trimester::First.position_tolerance() < Trimester::Third.position_tolerance());
    }

    #[test]
    fn test_registry_serves_all_known_ids() {
        let registry = PoseRegistry::new();
        for id in PoseRegistry::known_ids() {
            let pose = registry.get(id);
            assert_eq!(pose.id, *id);
            assert_eq!(pose.keypoints.len(), JointName::COUNT);
        }
    }

    #[test]
    fn test_cache_returns_shared_instance() {
        let registry = PoseRegistry::new();
        let a = registry.get("2-1");
        let b = registry.get("2-1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_unknown_id_defaults_to_mountain() {
        let registry = PoseRegistry::new();
        let pose = registry.get("9-9");
        assert_eq!(pose.id, "1-1");
    }

    #[test]
    fn test_mountain_pose_angles() {
        let registry = PoseRegistry::new();
        let pose = registry.get("1-1");
        assert_eq!(pose.angles.len(), 6);
        assert_eq!(pose.trimester, Trimester::First);
        let total = AngleDefinition::total_weight(&pose.angles);
        assert!((total - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_trimester_serde_lowercase() {
        let json = serde_json::to_string(&Trimester::Third).unwrap();
        assert_eq!(json, "\"third\"");
        let back: Trimester = serde_json::from_str("\"first\"").unwrap();
        assert_eq!(back, Trimester::First);
    }
}
