use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config_loader::{load_config, FailurePolicy, TrajSafeConfig};
use crate::consistency_check::audit_corpus;
use crate::explainer::{Explainer, OllamaExplainer};
use crate::log_sink::{init_tracing, resolve_level};
use crate::pipeline::Pipeline;
use crate::report_store::ReportStore;
use crate::trajectory::load_trajectory_groups;

/// Audit found at least one contract violation.
pub const EXIT_ISSUES: u8 = 2;

/// Top-level CLI interface for trajsafe
#[derive(Parser, Debug)]
#[command(
    name = "trajsafe",
    version,
    about = "Trajectory safety reporting with explanation auditing"
)]
pub struct Cli {
    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every trajectory in a CSV and write one JSON report per trajectory
    Run {
        /// Input CSV (trajectory time-series)
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory for JSON reports
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Explainer model name (e.g. mistral:latest)
        #[arg(long)]
        model: Option<String>,
        /// Path to the prompt template
        #[arg(long)]
        prompt: Option<PathBuf>,
        #[arg(long, value_enum)]
        failure_policy: Option<FailurePolicy>,
    },

    /// Check persisted reports for verdict/explanation consistency
    Audit {
        #[arg(default_value = "outputs")]
        dir: PathBuf,
    },
}

pub fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Run {
            input,
            out,
            model,
            prompt,
            failure_policy,
        } => {
            let mut config = load_config().context("loading configuration")?;
            if let Some(out) = out {
                config.output_dir = out;
            }
            if let Some(model) = model {
                config.explainer.model = model;
            }
            if let Some(prompt) = prompt {
                config.prompt_path = prompt;
            }
            if let Some(policy) = failure_policy {
                config.failure_policy = policy;
            }
            config.validate()?;

            init_tracing(resolve_level(&config.log_level, cli.verbose)?);
            run_pipeline(&config, &input)
        }
        Commands::Audit { dir } => {
            init_tracing(resolve_level("info", cli.verbose)?);
            Ok(run_audit(&dir))
        }
    }
}

pub fn run_pipeline(config: &TrajSafeConfig, input: &Path) -> anyhow::Result<ExitCode> {
    let template = std::fs::read_to_string(&config.prompt_path)
        .with_context(|| format!("reading prompt template {}", config.prompt_path.display()))?;
    let groups = load_trajectory_groups(input)
        .with_context(|| format!("loading trajectories from {}", input.display()))?;
    let explainer = OllamaExplainer::from_config(&config.explainer)?;
    let store = ReportStore::new(&config.output_dir);

    let rows: usize = groups.iter().map(|g| g.rows.len()).sum();
    println!("Loaded {} rows across {} trajectories.", rows, groups.len());
    println!("Output folder: {}", store.root().display());
    println!("LLM model: {} at {}\n", explainer.model(), explainer.endpoint());

    let pipeline = Pipeline::new(&template, &explainer, &store, config.failure_policy);
    let outcome = pipeline.run(&groups)?;
    info!(summary = %outcome.summary_path.display(), "summary written");

    if outcome.is_complete() {
        println!("Done. Saved reports.");
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "Done with {} failed trajectories (no report written):",
        outcome.failures.len()
    );
    for failure in &outcome.failures {
        println!("  traj_id={}: {}", failure.traj_id, failure.error);
    }
    Ok(ExitCode::FAILURE)
}

/// Audit every report under `dir`, printing per-trajectory results and a summary.
///
/// A report file that cannot be decoded is flagged and counted as an issue;
/// the rest of the corpus is still audited.
pub fn run_audit(dir: &Path) -> ExitCode {
    let corpus = match ReportStore::new(dir).load_corpus() {
        Ok(corpus) => corpus,
        Err(e) => {
            eprintln!("Failed to load reports from {}: {e}", dir.display());
            return ExitCode::FAILURE;
        }
    };
    if corpus.is_empty() {
        println!("No reports found.");
        return ExitCode::FAILURE;
    }

    println!(
        "Evaluating {} trajectory reports...\n",
        corpus.reports.len() + corpus.unreadable.len()
    );

    let summary = audit_corpus(&corpus);
    for line in summary.render_lines() {
        println!("{line}");
    }

    println!("\nSummary:");
    println!("  Trajectories checked: {}", summary.checked);
    println!("  Total issues found: {}", summary.issues);

    if summary.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_ISSUES)
    }
}
