//! Engine configuration.
//!
//! This module defines the [`EngineConfig`] struct, which controls detector
//! model selection, the detection timeout, smoothing, and the optional score
//! jitter.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`crate::engine::PoseEngine`].
///
/// Uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use prenatal_pose_engine::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_primary_model("movenet-thunder.onnx")
///     .with_min_confidence(0.2)
///     .with_threads(2);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the primary MoveNet Thunder ONNX model.
    /// If `None` (or loading fails), the chain starts at the secondary model.
    pub primary_model: Option<PathBuf>,
    /// Path to the secondary MoveNet Lightning ONNX model.
    /// If `None`, the chain falls straight through to the synthetic detector.
    pub secondary_model: Option<PathBuf>,
    /// Confidence threshold below which detected joints are discarded.
    pub min_confidence: f32,
    /// Per-call detection timeout. Expiry counts as a detector failure.
    pub detection_timeout: Duration,
    /// Whether temporal smoothing is applied between frames of a session.
    pub smoothing: bool,
    /// Seed for the optional post-scoring jitter. `None` disables jitter,
    /// which keeps accuracy bit-stable across identical frames.
    pub jitter_seed: Option<u64>,
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose the optimal number.
    pub num_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary_model: None,
            secondary_model: None,
            min_confidence: 0.1,
            detection_timeout: Duration::from_secs(2),
            smoothing: true,
            jitter_seed: None,
            num_threads: 0, // 0 = let ONNX Runtime decide
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary (Thunder) model path.
    #[must_use]
    pub fn with_primary_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.primary_model = Some(path.into());
        self
    }

    /// Set the secondary (Lightning) model path.
    #[must_use]
    pub fn with_secondary_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.secondary_model = Some(path.into());
        self
    }

    /// Set the joint confidence threshold.
    #[must_use]
    pub const fn with_min_confidence(mut self, threshold: f32) -> Self {
        self.min_confidence = threshold;
        self
    }

    /// Set the per-call detection timeout.
    #[must_use]
    pub const fn with_detection_timeout(mut self, timeout: Duration) -> Self {
        self.detection_timeout = timeout;
        self
    }

    /// Enable or disable temporal smoothing.
    #[must_use]
    pub const fn with_smoothing(mut self, enabled: bool) -> Self {
        self.smoothing = enabled;
        self
    }

    /// Enable the post-scoring jitter with an explicit seed.
    ///
    /// Jitter adds up to ±2% of uniform noise to the reported accuracy for
    /// a livelier feel in interactive clients. Deterministic under a fixed
    /// seed; off by default.
    #[must_use]
    pub const fn with_jitter(mut self, seed: u64) -> Self {
        self.jitter_seed = Some(seed);
        self
    }

    /// Set the number of intra-op threads for inference.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }
}
