//! Library root for the `trajsafe` crate
//! Offline trajectory risk scoring with explanation gating and consistency audits

// Core error handling
pub mod errors;

// Input
pub mod trajectory;

// Deterministic scoring
pub mod features;
pub mod rules;

// Explanations
pub mod explainer;
pub mod explanation;
pub mod gate;

// Reports & audit
pub mod consistency_check;
pub mod report;
pub mod report_store;

// Orchestration
pub mod pipeline;

// Configuration & CLI
pub mod cli;
pub mod config_loader;

// Logging
pub mod log_sink;

pub use consistency_check::{
    audit_corpus, audit_reports, check_report, AuditIssue, AuditSummary, ReportAudit,
};
pub use errors::{TrajSafeError, TrajSafeResult};
pub use explainer::{Explainer, OllamaExplainer};
pub use explanation::{parse_explanation, Explanation};
pub use features::{angle_wrap, compute_features, FeatureRecord};
pub use gate::ExplanationGate;
pub use report::{Report, ReportSummary, TrajectoryFailure};
pub use report_store::{ReportCorpus, ReportStore, UnreadableReport};
pub use rules::{rule_risk_label, RiskLabel, RiskVerdict, RuleId};
pub use trajectory::{Goal, Trajectory, TrajectorySample};
