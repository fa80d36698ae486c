use clap::{Args, Parser, Subcommand};

use crate::download::THUNDER_MODEL;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Analyze Options:
    --image, -i <IMAGE>        Path to the photo to analyze
    --pose, -p <POSE>          Reference pose id (1-1 .. 3-3) [default: 1-1]
    --trimester <TRIMESTER>    first, second, or third [default: the pose's own]
    --final                    Treat this frame as the session's final frame
    --model, -m <MODEL>        MoveNet ONNX model path [default: movenet-thunder.onnx]
    --no-model                 Skip model loading, use the synthetic detector
    --json                     Emit the full analysis as JSON
    --verbose                  Show verbose output

Examples:
    prenatal-pose-engine analyze --image frame.jpg --pose 2-1
    prenatal-pose-engine analyze -i frame.jpg -p 3-2 --trimester third --final
    prenatal-pose-engine analyze -i frame.jpg --json --no-model
    prenatal-pose-engine poses"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a photo against a reference pose
    Analyze(AnalyzeArgs),
    /// List the reference pose catalog
    Poses,
}

/// Arguments for the analyze command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the photo to analyze
    #[arg(short, long)]
    pub image: String,

    /// Reference pose id, e.g. 2-1
    #[arg(short, long, default_value = "1-1")]
    pub pose: String,

    /// Pregnancy trimester (first, second, third); defaults to the pose's own
    #[arg(long)]
    pub trimester: Option<String>,

    /// Treat this frame as the session's final frame
    #[arg(long = "final", default_value_t = false)]
    pub is_final: bool,

    /// Path to the MoveNet ONNX model; auto-downloaded when missing
    #[arg(short, long, default_value = THUNDER_MODEL)]
    pub model: String,

    /// Skip model loading and use the synthetic detector
    #[arg(long, default_value_t = false)]
    pub no_model: bool,

    /// Emit the full analysis as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Show verbose output
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}
