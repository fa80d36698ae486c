use std::fs;
use std::process;

use crate::cli::args::AnalyzeArgs;
use crate::config::EngineConfig;
use crate::engine::{FrameRequest, PoseEngine};
use crate::registry::{PoseRegistry, Trimester};
use crate::{download, error, info, logging, section, success, verbose, warn};

/// Run the `analyze` command.
pub fn run_analysis(args: &AnalyzeArgs) {
    logging::set_verbose(args.verbose);

    let image = match fs::read(&args.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read image '{}': {e}", args.image);
            process::exit(1);
        }
    };

    let mut config = EngineConfig::new();
    if !args.no_model {
        match download::try_download_model(&args.model) {
            Ok(path) => config = config.with_primary_model(path),
            Err(e) => {
                warn!("Model unavailable, continuing with synthetic detection: {e}");
            }
        }
    }

    let engine = PoseEngine::new(&config);
    let request = FrameRequest {
        image: &image,
        pose_id: &args.pose,
        trimester: args.trimester.as_deref().map(Trimester::parse_or_default),
        session: "cli",
        is_final_frame: args.is_final,
    };

    let analysis = engine.analyze(&request);

    if args.json {
        match serde_json::to_string_pretty(&analysis) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Failed to serialize analysis: {e}");
                process::exit(1);
            }
        }
        return;
    }

    success!(
        "Pose {} scored {:.1}% accuracy",
        analysis.pose_id,
        analysis.accuracy
    );
    info!("");
    for issue in &analysis.issues {
        info!("  \u{2022} {issue}");
    }
    info!("");
    info!("{}", analysis.feedback);
    section!("Processing");
    verbose!("{}", analysis.processing);
}

/// Run the `poses` command.
pub fn run_poses() {
    let registry = PoseRegistry::new();
    info!("{:<6} {:<10} {}", "ID", "TRIMESTER", "POSE");
    for id in PoseRegistry::known_ids() {
        let pose = registry.get(id);
        info!("{:<6} {:<10} {}", pose.id, pose.trimester.as_str(), pose.title);
        verbose!("       {}", pose.description);
    }
}
