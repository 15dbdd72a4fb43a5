use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use trajsafe::cli::run_audit;
use trajsafe::log_sink::init_tracing;

/// Standalone auditor for a directory of trajsafe reports
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Directory holding report_traj_*.json files
    #[clap(default_value = "outputs")]
    dir: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(tracing::Level::INFO);
    run_audit(&args.dir)
}
