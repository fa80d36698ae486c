//! Keypoint detection as a pluggable capability with ordered fallback.
//!
//! A [`KeypointDetector`] turns a camera frame into a [`Skeleton`]. The
//! engine composes detectors into a [`DetectorChain`]: the primary learned
//! model (MoveNet Thunder), an optional secondary model (MoveNet Lightning),
//! and a deterministic synthetic fallback. The chain commits to the first
//! working detector and only walks back down when it begins failing, so the
//! chain as a whole never fails to produce a skeleton.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use image::RgbImage;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use crate::error::{PoseError, Result};
use crate::preprocessing::{canvas_to_tensor, letterbox};
use crate::skeleton::{JointName, Keypoint, Skeleton};
use crate::warn;

/// Minimum seconds between logged detector failures.
const ERROR_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Confidence assigned to every joint of the synthetic fallback skeleton.
pub const SYNTHETIC_CONFIDENCE: f32 = 0.5;

/// A capability that maps an RGB frame to a skeleton.
///
/// Implementations own their preprocessing: callers hand over the raw frame
/// and always receive coordinates normalized to that frame's unit square.
pub trait KeypointDetector: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Whether this detector is currently able to serve calls.
    fn available(&self) -> bool;

    /// Detect a skeleton in the frame.
    fn detect(&self, image: &RgbImage) -> Result<Skeleton>;
}

/// MoveNet single-pose model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveNetVariant {
    /// Higher accuracy, 256x256 input.
    Thunder,
    /// Faster, 192x192 input.
    Lightning,
}

impl MoveNetVariant {
    /// Square model input side length.
    #[must_use]
    pub const fn input_size(self) -> u32 {
        match self {
            Self::Thunder => 256,
            Self::Lightning => 192,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thunder => "movenet-thunder",
            Self::Lightning => "movenet-lightning",
        }
    }
}

/// ONNX-backed MoveNet single-pose detector.
///
/// The graph takes a `[1, S, S, 3]` f32 tensor of raw 0-255 channel values
/// and yields `[1, 1, 17, 3]` rows of `(y, x, confidence)` per joint,
/// normalized to the letterboxed input square.
pub struct MoveNetDetector {
    session: Mutex<Session>,
    variant: MoveNetVariant,
    input_name: String,
    output_name: String,
    min_confidence: f32,
}

impl MoveNetDetector {
    /// Load a MoveNet ONNX model from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file is missing or the session cannot
    /// be created.
    pub fn load(
        path: impl AsRef<std::path::Path>,
        variant: MoveNetVariant,
        num_threads: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PoseError::ModelLoad(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| PoseError::ModelLoad(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| PoseError::ModelLoad(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(num_threads)
            .map_err(|e| PoseError::ModelLoad(format!("Failed to set thread count: {e}")))?
            .commit_from_file(path)
            .map_err(|e| PoseError::ModelLoad(format!("Failed to load model: {e}")))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input".to_string());
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| "output_0".to_string());

        Ok(Self {
            session: Mutex::new(session),
            variant,
            input_name,
            output_name,
            min_confidence: 0.1,
        })
    }

    /// Set the confidence floor below which joints are dropped.
    #[must_use]
    pub const fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    fn run_inference(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| PoseError::Inference("Detector session lock poisoned".to_string()))?;

        let input_contiguous = input.as_standard_layout();
        let input_tensor = TensorRef::from_array_view(&input_contiguous)
            .map_err(|e| PoseError::Inference(format!("Failed to create input tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| PoseError::Inference(format!("Inference failed: {e}")))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| {
                PoseError::Inference(format!("Output '{}' not found", self.output_name))
            })?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PoseError::Inference(format!("Failed to extract output: {e}")))?;

        if data.len() < JointName::COUNT * 3 {
            return Err(PoseError::Inference(format!(
                "Unexpected output size: {}",
                data.len()
            )));
        }

        Ok(data.to_vec())
    }
}

impl KeypointDetector for MoveNetDetector {
    fn name(&self) -> &str {
        self.variant.as_str()
    }

    fn available(&self) -> bool {
        true
    }

    fn detect(&self, image: &RgbImage) -> Result<Skeleton> {
        let target = self.variant.input_size();
        let (canvas, info) = letterbox(image, target)?;
        let tensor = canvas_to_tensor(&canvas, target);
        let data = self.run_inference(&tensor)?;

        let mut skeleton = Skeleton::new();
        for (idx, joint) in JointName::ALL.iter().enumerate() {
            let y = data[idx * 3];
            let x = data[idx * 3 + 1];
            let confidence = data[idx * 3 + 2];
            if confidence < self.min_confidence {
                continue;
            }
            let (ox, oy) = info.unletterbox(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
            skeleton.set(*joint, Keypoint::new(ox, oy, confidence.clamp(0.0, 1.0)));
        }
        Ok(skeleton)
    }
}

/// Deterministic last-resort detector producing a neutral standing skeleton.
///
/// Always available and never fails, so a coaching session keeps flowing
/// even when no learned model can run.
#[derive(Debug, Default)]
pub struct SyntheticDetector;

impl KeypointDetector for SyntheticDetector {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn available(&self) -> bool {
        true
    }

    fn detect(&self, _image: &RgbImage) -> Result<Skeleton> {
        Ok(neutral_skeleton())
    }
}

/// The neutral standing skeleton used whenever detection is unavailable.
#[must_use]
pub fn neutral_skeleton() -> Skeleton {
    const POSITIONS: [(JointName, f32, f32); 17] = [
        (JointName::Nose, 0.5, 0.10),
        (JointName::LeftEye, 0.48, 0.09),
        (JointName::RightEye, 0.52, 0.09),
        (JointName::LeftEar, 0.46, 0.08),
        (JointName::RightEar, 0.54, 0.08),
        (JointName::LeftShoulder, 0.42, 0.22),
        (JointName::RightShoulder, 0.58, 0.22),
        (JointName::LeftElbow, 0.42, 0.36),
        (JointName::RightElbow, 0.58, 0.36),
        (JointName::LeftWrist, 0.42, 0.48),
        (JointName::RightWrist, 0.58, 0.48),
        (JointName::LeftHip, 0.45, 0.55),
        (JointName::RightHip, 0.55, 0.55),
        (JointName::LeftKnee, 0.45, 0.75),
        (JointName::RightKnee, 0.55, 0.75),
        (JointName::LeftAnkle, 0.45, 0.95),
        (JointName::RightAnkle, 0.55, 0.95),
    ];

    POSITIONS
        .iter()
        .map(|&(joint, x, y)| (joint, Keypoint::new(x, y, SYNTHETIC_CONFIDENCE)))
        .collect()
}

/// Ordered detector fallback chain.
///
/// Commits to the first available detector that yields a non-empty skeleton
/// and keeps using it; a per-call failure, empty result, or timeout walks
/// down the chain. `detect` is infallible: if every detector fails the
/// neutral skeleton is returned.
pub struct DetectorChain {
    detectors: Vec<Arc<dyn KeypointDetector>>,
    committed: AtomicUsize,
    timeout: Duration,
    last_error_log: Mutex<Option<Instant>>,
}

impl DetectorChain {
    /// Build a chain from detectors in priority order.
    #[must_use]
    pub fn new(detectors: Vec<Arc<dyn KeypointDetector>>, timeout: Duration) -> Self {
        Self {
            detectors,
            committed: AtomicUsize::new(0),
            timeout,
            last_error_log: Mutex::new(None),
        }
    }

    /// Name of the currently committed detector, if any.
    #[must_use]
    pub fn committed_name(&self) -> Option<&str> {
        self.detectors
            .get(self.committed.load(Ordering::Relaxed))
            .map(|d| d.name())
    }

    /// Detect a skeleton, walking the fallback chain as needed.
    pub fn detect(&self, image: &RgbImage) -> Skeleton {
        let image = Arc::new(image.clone());
        let start = self.committed.load(Ordering::Relaxed).min(self.detectors.len());

        for idx in start..self.detectors.len() {
            let detector = &self.detectors[idx];
            if !detector.available() {
                continue;
            }

            match self.detect_bounded(Arc::clone(detector), Arc::clone(&image)) {
                Ok(skeleton) if !skeleton.is_empty() => {
                    self.committed.store(idx, Ordering::Relaxed);
                    return skeleton;
                }
                Ok(_) => {
                    self.log_throttled(&format!(
                        "Detector '{}' returned an empty skeleton, falling back",
                        detector.name()
                    ));
                }
                Err(e) => {
                    self.log_throttled(&format!("Detector '{}' failed: {e}", detector.name()));
                }
            }
        }

        neutral_skeleton()
    }

    /// Run one detector on a helper thread, bounded by the chain timeout.
    /// Expiry is treated identically to a detector failure.
    fn detect_bounded(
        &self,
        detector: Arc<dyn KeypointDetector>,
        image: Arc<RgbImage>,
    ) -> Result<Skeleton> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(detector.detect(&image));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(_) => Err(PoseError::Inference(format!(
                "Detection timed out after {:?}",
                self.timeout
            ))),
        }
    }

    /// Log at most once per [`ERROR_LOG_INTERVAL`] to avoid flooding when a
    /// detector fails on every frame.
    fn log_throttled(&self, message: &str) {
        let mut last = match self.last_error_log.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        let now = Instant::now();
        if last.map_or(true, |t| now.duration_since(t) >= ERROR_LOG_INTERVAL) {
            warn!("{message}");
            *last = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingDetector;

    impl KeypointDetector for FailingDetector {
        fn name(&self) -> &str {
            "failing"
        }
        fn available(&self) -> bool {
            true
        }
        fn detect(&self, _image: &RgbImage) -> Result<Skeleton> {
            Err(PoseError::Inference("broken".to_string()))
        }
    }

    struct UnavailableDetector;

    impl KeypointDetector for UnavailableDetector {
        fn name(&self) -> &str {
            "unavailable"
        }
        fn available(&self) -> bool {
            false
        }
        fn detect(&self, _image: &RgbImage) -> Result<Skeleton> {
            Ok(Skeleton::new())
        }
    }

    struct EmptyDetector;

    impl KeypointDetector for EmptyDetector {
        fn name(&self) -> &str {
            "empty"
        }
        fn available(&self) -> bool {
            true
        }
        fn detect(&self, _image: &RgbImage) -> Result<Skeleton> {
            Ok(Skeleton::new())
        }
    }

    fn frame() -> RgbImage {
        RgbImage::from_pixel(32, 32, image::Rgb([0, 0, 0]))
    }

    #[test]
    fn test_synthetic_detector_full_skeleton() {
        let skeleton = SyntheticDetector.detect(&frame()).unwrap();
        assert_eq!(skeleton.len(), JointName::COUNT);
        for (_, kp) in skeleton.iter() {
            assert!((kp.confidence - SYNTHETIC_CONFIDENCE).abs() < f32::EPSILON);
            assert!((0.0..=1.0).contains(&kp.x));
            assert!((0.0..=1.0).contains(&kp.y));
        }
    }

    #[test]
    fn test_chain_falls_back_past_failures() {
        let chain = DetectorChain::new(
            vec![
                Arc::new(FailingDetector),
                Arc::new(UnavailableDetector),
                Arc::new(SyntheticDetector),
            ],
            Duration::from_secs(1),
        );

        let skeleton = chain.detect(&frame());
        assert_eq!(skeleton.len(), JointName::COUNT);
        assert_eq!(chain.committed_name(), Some("synthetic"));
    }

    #[test]
    fn test_chain_treats_empty_as_failure() {
        let chain = DetectorChain::new(
            vec![Arc::new(EmptyDetector), Arc::new(SyntheticDetector)],
            Duration::from_secs(1),
        );
        let skeleton = chain.detect(&frame());
        assert!(!skeleton.is_empty());
        assert_eq!(chain.committed_name(), Some("synthetic"));
    }

    #[test]
    fn test_chain_with_no_detectors_yields_neutral() {
        let chain = DetectorChain::new(vec![], Duration::from_secs(1));
        let skeleton = chain.detect(&frame());
        assert_eq!(skeleton, neutral_skeleton());
    }

    #[test]
    fn test_chain_commits_across_calls() {
        let chain = DetectorChain::new(
            vec![Arc::new(FailingDetector), Arc::new(SyntheticDetector)],
            Duration::from_secs(1),
        );
        chain.detect(&frame());
        assert_eq!(chain.committed_name(), Some("synthetic"));
        // Second call starts at the committed detector.
        chain.detect(&frame());
        assert_eq!(chain.committed_name(), Some("synthetic"));
    }
}
