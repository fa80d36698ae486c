#![allow(clippy::multiple_crate_versions)]

//! # Prenatal Pose Engine
//!
//! Pose capture and scoring engine for prenatal yoga coaching, written in
//! Rust. A single frame flows through keypoint detection (MoveNet over ONNX
//! Runtime, with an ordered fallback chain), temporal smoothing, angle-based
//! scoring against a reference pose catalog, issue diagnosis, and coaching
//! text composition.
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use prenatal_pose_engine::{EngineConfig, FrameRequest, PoseEngine};
//!
//! let config = EngineConfig::new().with_primary_model("movenet-thunder.onnx");
//! let engine = PoseEngine::new(&config);
//!
//! let image = std::fs::read("frame.jpg").unwrap();
//! let analysis = engine.analyze(&FrameRequest {
//!     image: &image,
//!     pose_id: "2-1",
//!     trimester: None,
//!     session: "client-42",
//!     is_final_frame: false,
//! });
//! println!("{:.1}%: {}", analysis.accuracy, analysis.feedback);
//! ```
//!
//! `analyze` is infallible: detector failures, undecodable images,
//! and unknown pose ids all degrade to a well-formed result so a coaching
//! session never crashes on a single bad frame.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Analyze a photo against Warrior II (auto-downloads the model)
//! prenatal-pose-engine analyze --image frame.jpg --pose 2-1
//!
//! # Final frame of a third-trimester session, JSON output
//! prenatal-pose-engine analyze -i frame.jpg -p 3-1 --trimester third --final --json
//!
//! # List the pose catalog
//! prenatal-pose-engine poses
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`engine`] | [`PoseEngine`] orchestrating the full per-frame pipeline |
//! | [`detector`] | [`KeypointDetector`] capability and the fallback [`DetectorChain`] |
//! | [`smoothing`] | Per-session Gaussian temporal smoothing |
//! | [`registry`] | Reference pose catalog with lazy shared caching |
//! | [`evaluator`] | Angle- and position-based accuracy scoring |
//! | [`diagnoser`] | Ranked corrective issue detection |
//! | [`feedback`] | Coaching text composition |
//! | [`skeleton`] | [`Skeleton`], [`Keypoint`], and joint naming |
//! | [`preprocessing`] | Image decoding and letterboxing |
//! | [`config`] | [`EngineConfig`] builder |
//! | [`error`] | Error types ([`PoseError`], [`Result`]) |
//! | [`download`] | MoveNet model auto-download |

// Modules
pub mod cli;
pub mod config;
pub mod detector;
pub mod diagnoser;
pub mod download;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod feedback;
pub mod logging;
mod poses;
pub mod preprocessing;
pub mod registry;
pub mod skeleton;
pub mod smoothing;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use detector::{DetectorChain, KeypointDetector, MoveNetDetector, MoveNetVariant, SyntheticDetector};
pub use engine::{FrameAnalysis, FrameRequest, PoseEngine, Timing};
pub use error::{PoseError, Result};
pub use evaluator::{Evaluation, PoseClassifier, ScoringMethod};
pub use registry::{AngleDefinition, PoseRegistry, ReferencePose, Trimester};
pub use skeleton::{JointName, Keypoint, Skeleton, CONNECTIONS};
pub use smoothing::SmoothingHistory;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
