//! Offline audit of the verdict/explanation contract over a report corpus.
//!
//! Checks never stop at the first finding: every issue in every report is
//! collected.

use std::fmt;

use serde::Serialize;

use crate::report::Report;
use crate::report_store::{ReportCorpus, UnreadableReport};
use crate::rules::RiskLabel;

/// A single contract violation found in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditIssue {
    ExplanationNotSkipped,
    ExplanationMissing,
    LabelMismatch { rule: RiskLabel, llm: String },
    UnlinkedReason { reason: String },
}

impl fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditIssue::ExplanationNotSkipped => {
                write!(f, "LLM should be skipped for SAFE trajectory.")
            }
            AuditIssue::ExplanationMissing => {
                write!(f, "LLM explanation missing for non-SAFE trajectory.")
            }
            AuditIssue::LabelMismatch { rule, llm } => {
                write!(f, "Label mismatch: rule={rule} llm={llm}")
            }
            AuditIssue::UnlinkedReason { reason } => {
                write!(f, "Reason not linked to active rule: '{reason}'")
            }
        }
    }
}

/// Audit result for one trajectory. No issues means OK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportAudit {
    pub traj_id: i64,
    pub issues: Vec<AuditIssue>,
}

impl ReportAudit {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// `[traj_id=N] OK`, or a header followed by one indented line per issue.
    pub fn render_lines(&self) -> Vec<String> {
        if self.is_ok() {
            return vec![format!("[traj_id={}] OK", self.traj_id)];
        }
        let mut lines = vec![format!("[traj_id={}] ISSUES:", self.traj_id)];
        lines.extend(self.issues.iter().map(|i| format!("  - {i}")));
        lines
    }
}

/// Totals over a corpus. A report file that could not be decoded counts as
/// checked and as one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub checked: usize,
    pub issues: usize,
    pub results: Vec<ReportAudit>,
    pub unreadable: Vec<UnreadableReport>,
}

impl AuditSummary {
    pub fn passed(&self) -> bool {
        self.issues == 0
    }

    /// Per-report lines in `traj_id` order, then one line per unreadable file.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.results.iter().flat_map(|r| r.render_lines()).collect();
        lines.extend(
            self.unreadable
                .iter()
                .map(|u| format!("[file={}] UNREADABLE: {}", u.path.display(), u.error)),
        );
        lines
    }
}

pub fn check_report(report: &Report) -> ReportAudit {
    let mut issues = Vec::new();

    if report.risk.label == RiskLabel::Safe {
        if report.explanation.is_some() {
            issues.push(AuditIssue::ExplanationNotSkipped);
        }
    } else {
        match &report.explanation {
            None => issues.push(AuditIssue::ExplanationMissing),
            Some(exp) => {
                if exp.label != report.risk.label.as_str() {
                    issues.push(AuditIssue::LabelMismatch {
                        rule: report.risk.label,
                        llm: exp.label.clone(),
                    });
                }

                let cited: Vec<String> = report.risk.rules.iter().map(|r| r.bracketed()).collect();
                for reason in &exp.reasons {
                    if !cited.iter().any(|c| reason.contains(c.as_str())) {
                        issues.push(AuditIssue::UnlinkedReason {
                            reason: reason.clone(),
                        });
                    }
                }
            }
        }
    }

    ReportAudit {
        traj_id: report.traj_id,
        issues,
    }
}

pub fn audit_reports(reports: &[Report]) -> AuditSummary {
    let results: Vec<ReportAudit> = reports.iter().map(check_report).collect();
    AuditSummary {
        checked: results.len(),
        issues: results.iter().map(|r| r.issues.len()).sum(),
        results,
        unreadable: Vec::new(),
    }
}

pub fn audit_corpus(corpus: &ReportCorpus) -> AuditSummary {
    let mut summary = audit_reports(&corpus.reports);
    summary.checked += corpus.unreadable.len();
    summary.issues += corpus.unreadable.len();
    summary.unreadable = corpus.unreadable.clone();
    summary
}
