//! Per-trajectory orchestration: features, verdict, explanation, report.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config_loader::FailurePolicy;
use crate::errors::TrajSafeResult;
use crate::explainer::Explainer;
use crate::features::compute_features;
use crate::gate::ExplanationGate;
use crate::report::{Report, ReportSummary, TrajectoryFailure};
use crate::report_store::ReportStore;
use crate::rules::rule_risk_label;
use crate::trajectory::TrajectoryGroup;

#[derive(Debug)]
pub struct PipelineOutcome {
    pub reports: Vec<Report>,
    pub failures: Vec<TrajectoryFailure>,
    pub summary_path: PathBuf,
}

impl PipelineOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Pipeline<'a> {
    gate: ExplanationGate<'a>,
    explainer: &'a dyn Explainer,
    store: &'a ReportStore,
    policy: FailurePolicy,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        template: &'a str,
        explainer: &'a dyn Explainer,
        store: &'a ReportStore,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            gate: ExplanationGate::new(template, explainer),
            explainer,
            store,
            policy,
        }
    }

    /// Build the report for one trajectory without persisting it.
    pub fn process(&self, group: &TrajectoryGroup) -> TrajSafeResult<Report> {
        let traj = group.to_trajectory()?;
        let features = compute_features(&traj)?;
        let risk = rule_risk_label(&features);
        info!(
            traj_id = group.traj_id,
            label = %risk.label,
            score = risk.score,
            "trajectory scored"
        );
        let explanation = self.gate.explain(&features, &risk)?;
        Ok(Report::new(group.traj_id, features, risk, explanation))
    }

    /// Process every group in order, writing each report as soon as it exists.
    ///
    /// Data errors always stay local to their trajectory. Explainer errors
    /// follow the configured [`FailurePolicy`]. Any error that stops the run,
    /// including a report that cannot be written, still leaves a summary of
    /// the completed reports behind.
    pub fn run(&self, groups: &[TrajectoryGroup]) -> TrajSafeResult<PipelineOutcome> {
        self.store.ensure_dir()?;

        let mut reports = Vec::with_capacity(groups.len());
        let mut failures = Vec::new();

        for group in groups {
            let persisted = self.process(group).and_then(|report| {
                self.store.save_report(&report)?;
                Ok(report)
            });
            match persisted {
                Ok(report) => {
                    for line in report.summary_lines() {
                        println!("{line}");
                    }
                    println!();
                    reports.push(report);
                }
                Err(err) if err.is_data() => {
                    warn!(traj_id = group.traj_id, error = %err, "trajectory skipped");
                    failures.push(TrajectoryFailure {
                        traj_id: group.traj_id,
                        error: err.to_string(),
                    });
                }
                Err(err) if err.is_external_service() && self.policy == FailurePolicy::Isolate => {
                    warn!(traj_id = group.traj_id, error = %err, "explainer failed, trajectory skipped");
                    failures.push(TrajectoryFailure {
                        traj_id: group.traj_id,
                        error: err.to_string(),
                    });
                }
                Err(err) => {
                    failures.push(TrajectoryFailure {
                        traj_id: group.traj_id,
                        error: err.to_string(),
                    });
                    self.write_summary(reports, failures)?;
                    return Err(err);
                }
            }
        }

        let summary_path = self.write_summary(reports.clone(), failures.clone())?;
        Ok(PipelineOutcome {
            reports,
            failures,
            summary_path,
        })
    }

    fn write_summary(
        &self,
        reports: Vec<Report>,
        failures: Vec<TrajectoryFailure>,
    ) -> TrajSafeResult<PathBuf> {
        let summary = ReportSummary::new(self.explainer.model(), reports, failures);
        self.store.save_summary(&summary)
    }
}
