use clap::Parser;

use prenatal_pose_engine::cli::analyze::{run_analysis, run_poses};
use prenatal_pose_engine::cli::args::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analysis(&args),
        Commands::Poses => run_poses(),
    }
}
