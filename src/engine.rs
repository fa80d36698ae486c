//! The pose analysis engine.
//!
//! [`PoseEngine`] ties the pipeline together: decode, detect through the
//! fallback chain, smooth against the session's history, score against the
//! reference pose, diagnose issues, and compose coaching text. `analyze`
//! is infallible: every failure mode degrades to a well-formed result so a
//! coaching session never sees an error for a single bad frame.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::detector::{
    neutral_skeleton, DetectorChain, KeypointDetector, MoveNetDetector, MoveNetVariant,
    SyntheticDetector,
};
use crate::evaluator::{self, PoseClassifier};
use crate::feedback;
use crate::preprocessing::decode_image;
use crate::registry::{PoseRegistry, Trimester};
use crate::skeleton::Skeleton;
use crate::smoothing::SmoothingHistory;
use crate::{diagnoser, verbose, warn};

/// Jitter span as a fraction of the full score range, each side.
const JITTER_SPAN: f32 = 0.02;

/// One inbound frame to analyze.
#[derive(Debug, Clone)]
pub struct FrameRequest<'a> {
    /// Encoded image bytes in any common format.
    pub image: &'a [u8],
    /// Curriculum pose id, e.g. `"2-1"`.
    pub pose_id: &'a str,
    /// Explicit trimester; defaults to the pose's own when `None`.
    pub trimester: Option<Trimester>,
    /// Caller-supplied session identity keying the smoothing history.
    pub session: &'a str,
    /// Whether this is the last frame of the session.
    pub is_final_frame: bool,
}

/// Per-stage wall-clock timings in milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Timing {
    pub preprocess_ms: f64,
    pub detect_ms: f64,
    pub evaluate_ms: f64,
    pub total_ms: f64,
}

impl std::fmt::Display for Timing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.1}ms preprocess, {:.1}ms detect, {:.1}ms evaluate, {:.1}ms total",
            self.preprocess_ms, self.detect_ms, self.evaluate_ms, self.total_ms
        )
    }
}

/// Analysis result for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameAnalysis {
    /// The pose id as requested, echoed for client-side correlation even
    /// when an unknown id was resolved to the default pose.
    pub pose_id: String,
    /// Accuracy percentage in [0, 100].
    pub accuracy: f32,
    /// Smoothed detected skeleton, normalized to the original image.
    pub keypoints: Skeleton,
    /// Canonical skeleton of the reference pose, for overlay rendering.
    pub reference_keypoints: Skeleton,
    /// At most three corrections, most severe first.
    pub issues: Vec<String>,
    /// Coaching paragraph; never empty.
    pub feedback: String,
    pub processing: Timing,
}

/// Per-session smoothing histories.
///
/// Same-session frames serialize on the session's own mutex; distinct
/// sessions proceed in parallel.
#[derive(Default)]
struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<SmoothingHistory>>>>,
}

impl SessionStore {
    fn history(&self, session: &str) -> Arc<Mutex<SmoothingHistory>> {
        if let Ok(sessions) = self.sessions.read() {
            if let Some(history) = sessions.get(session) {
                return Arc::clone(history);
            }
        }

        let mut sessions = match self.sessions.write() {
            Ok(guard) => guard,
            // Poisoned store: hand out a detached history rather than fail.
            Err(_) => return Arc::new(Mutex::new(SmoothingHistory::new())),
        };
        Arc::clone(
            sessions
                .entry(session.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(SmoothingHistory::new()))),
        )
    }

    fn remove(&self, session: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(session);
        }
    }

    fn len(&self) -> usize {
        self.sessions.read().map_or(0, |s| s.len())
    }
}

/// The engine. Constructed once at process start and shared by reference
/// across request handlers.
pub struct PoseEngine {
    chain: DetectorChain,
    registry: PoseRegistry,
    sessions: SessionStore,
    classifier: Option<Box<dyn PoseClassifier>>,
    jitter: Option<Mutex<StdRng>>,
    smoothing: bool,
}

impl PoseEngine {
    /// Build an engine from a configuration.
    ///
    /// Learned models that fail to load are logged and skipped; the chain
    /// always ends in the synthetic detector, so construction never fails.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let mut detectors: Vec<Arc<dyn KeypointDetector>> = Vec::with_capacity(3);

        let variants = [
            (config.primary_model.as_deref(), MoveNetVariant::Thunder),
            (config.secondary_model.as_deref(), MoveNetVariant::Lightning),
        ];
        for (path, variant) in variants {
            let Some(path) = path else { continue };
            match MoveNetDetector::load(path, variant, config.num_threads) {
                Ok(detector) => {
                    verbose!("Loaded {} from {}", variant.as_str(), path.display());
                    detectors.push(Arc::new(detector.with_min_confidence(config.min_confidence)));
                }
                Err(e) => {
                    warn!("Skipping {}: {e}", variant.as_str());
                }
            }
        }
        detectors.push(Arc::new(SyntheticDetector));

        Self {
            chain: DetectorChain::new(detectors, config.detection_timeout),
            registry: PoseRegistry::new(),
            sessions: SessionStore::default(),
            classifier: None,
            jitter: config
                .jitter_seed
                .map(|seed| Mutex::new(StdRng::seed_from_u64(seed))),
            smoothing: config.smoothing,
        }
    }

    /// Install an optional learned classifier blended into the score.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn PoseClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Shared reference pose registry.
    #[must_use]
    pub const fn registry(&self) -> &PoseRegistry {
        &self.registry
    }

    /// Number of sessions with live smoothing history.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Analyze one frame.
    pub fn analyze(&self, request: &FrameRequest<'_>) -> FrameAnalysis {
        let start = Instant::now();

        let decoded = decode_image(request.image);
        let preprocess_ms = elapsed_ms(start);

        let detect_start = Instant::now();
        let raw = match &decoded {
            Ok(image) => self.chain.detect(image),
            Err(e) => {
                warn!("Image decode failed, using neutral skeleton: {e}");
                neutral_skeleton()
            }
        };
        let detect_ms = elapsed_ms(detect_start);

        let smoothed = self.smooth(request.session, raw);
        if request.is_final_frame {
            self.sessions.remove(request.session);
        }

        let evaluate_start = Instant::now();
        let reference = self.registry.get(request.pose_id);
        let trimester = request.trimester.unwrap_or(reference.trimester);

        let evaluation = evaluator::evaluate(&smoothed, &reference, trimester);
        let classified = self
            .classifier
            .as_ref()
            .and_then(|c| c.score(&smoothed, reference.id));
        let accuracy = self.apply_jitter(evaluator::blend_with_classifier(
            evaluation.accuracy,
            classified,
        ));

        let issues = diagnoser::diagnose(&smoothed, &reference);
        let feedback = feedback::compose(
            &reference,
            accuracy,
            &issues,
            trimester,
            request.is_final_frame,
        );
        let evaluate_ms = elapsed_ms(evaluate_start);

        let processing = Timing {
            preprocess_ms,
            detect_ms,
            evaluate_ms,
            total_ms: elapsed_ms(start),
        };
        verbose!("Analyzed pose {} in {processing}", reference.id);

        FrameAnalysis {
            pose_id: request.pose_id.to_string(),
            accuracy,
            keypoints: smoothed,
            reference_keypoints: reference.keypoints.clone(),
            issues: issues.into_iter().map(|i| i.description).collect(),
            feedback,
            processing,
        }
    }

    /// Drop a session's smoothing history.
    pub fn end_session(&self, session: &str) {
        self.sessions.remove(session);
    }

    fn smooth(&self, session: &str, raw: Skeleton) -> Skeleton {
        if !self.smoothing {
            return raw;
        }
        let history = self.sessions.history(session);
        let mut history = match history.lock() {
            Ok(guard) => guard,
            Err(_) => return raw,
        };
        history.push(raw);
        history.smoothed()
    }

    fn apply_jitter(&self, accuracy: f32) -> f32 {
        let Some(rng) = &self.jitter else {
            return accuracy;
        };
        let Ok(mut rng) = rng.lock() else {
            return accuracy;
        };
        let noise = (rng.gen::<f32>() - 0.5) * 2.0 * JITTER_SPAN * 100.0;
        (accuracy + noise).clamp(0.0, 100.0)
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
