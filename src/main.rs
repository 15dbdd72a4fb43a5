// trajsafe - score trajectories, explain risky ones, audit the explanations

use std::process::ExitCode;

use clap::Parser;
use trajsafe::cli::{dispatch, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}
