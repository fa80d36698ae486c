//! Temporal smoothing of skeleton streams.
//!
//! Raw per-frame detections jitter. Each session keeps a short rolling
//! history of skeletons; the smoothed skeleton is a Gaussian-weighted
//! average over that window, evaluated at the newest frame, so recent
//! frames dominate and single-frame noise is damped.

use std::collections::VecDeque;

use crate::skeleton::{JointName, Keypoint, Skeleton};

/// Rolling window length in frames.
pub const WINDOW_SIZE: usize = 5;

/// Gaussian kernel standard deviation, in frames.
pub const SIGMA: f32 = 1.0;

/// Frames required before smoothing engages. Below this the latest
/// skeleton passes through unchanged.
const MIN_SAMPLES: usize = 3;

/// Samples averaged for the smoothed confidence value.
const CONFIDENCE_WINDOW: usize = 3;

/// Per-session rolling history of raw skeletons, oldest first.
#[derive(Debug, Default, Clone)]
pub struct SmoothingHistory {
    frames: VecDeque<Skeleton>,
}

impl SmoothingHistory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(WINDOW_SIZE),
        }
    }

    /// Append a raw skeleton, evicting the oldest frame past the window.
    pub fn push(&mut self, skeleton: Skeleton) {
        if self.frames.len() == WINDOW_SIZE {
            self.frames.pop_front();
        }
        self.frames.push_back(skeleton);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Smooth the most recent skeleton against the window.
    ///
    /// With fewer than three frames the newest skeleton is returned as-is.
    /// Every joint seen anywhere in the window is emitted, so a joint
    /// occluded in the newest frame is carried through at its smoothed
    /// historical position rather than dropped; frames where a joint is
    /// absent are left out of its average, with the kernel renormalized
    /// over the frames that remain.
    #[must_use]
    pub fn smoothed(&self) -> Skeleton {
        let Some(latest) = self.frames.back() else {
            return Skeleton::new();
        };
        if self.frames.len() < MIN_SAMPLES {
            return latest.clone();
        }

        let n = self.frames.len();
        let weights: Vec<f32> = (0..n).map(|j| kernel_weight(n, j)).collect();

        let mut out = Skeleton::new();
        for joint in JointName::ALL {
            let mut sum_x = 0.0f32;
            let mut sum_y = 0.0f32;
            let mut total = 0.0f32;
            for (frame, &w) in self.frames.iter().zip(&weights) {
                if let Some(kp) = frame.get(joint) {
                    sum_x += kp.x * w;
                    sum_y += kp.y * w;
                    total += w;
                }
            }
            if total <= 0.0 {
                continue;
            }

            out.set(
                joint,
                Keypoint::new(
                    sum_x / total,
                    sum_y / total,
                    self.smoothed_confidence(joint),
                ),
            );
        }
        out
    }

    /// Confidence is a plain mean over the last few samples where the joint
    /// was seen, so a briefly occluded joint recovers gradually.
    fn smoothed_confidence(&self, joint: JointName) -> f32 {
        let mut sum = 0.0f32;
        let mut count = 0usize;
        for frame in self.frames.iter().rev() {
            if let Some(kp) = frame.get(joint) {
                sum += kp.confidence;
                count += 1;
                if count == CONFIDENCE_WINDOW {
                    break;
                }
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }
}

/// Truncated one-sided Gaussian weight for history index `j` out of `n`
/// frames, centered on the newest frame `n - 1`.
fn kernel_weight(n: usize, j: usize) -> f32 {
    let d = (n - 1 - j) as f32;
    (-d * d / (2.0 * SIGMA * SIGMA)).exp()
}
