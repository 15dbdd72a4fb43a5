//! Per-trajectory report records and the corpus-wide summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::explanation::Explanation;
use crate::features::FeatureRecord;
use crate::rules::RiskVerdict;

/// Everything produced for one trajectory. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub traj_id: i64,
    pub features: FeatureRecord,
    #[serde(alias = "rule_risk")]
    pub risk: RiskVerdict,
    #[serde(default, alias = "llm_explanation")]
    pub explanation: Option<Explanation>,
}

impl Report {
    pub fn new(
        traj_id: i64,
        features: FeatureRecord,
        risk: RiskVerdict,
        explanation: Option<Explanation>,
    ) -> Self {
        Self {
            traj_id,
            features,
            risk,
            explanation,
        }
    }

    /// Console lines for this report.
    pub fn summary_lines(&self) -> Vec<String> {
        let rules: Vec<&str> = self.risk.rules.iter().map(|r| r.as_str()).collect();
        let mut lines = vec![
            format!("traj_id={}", self.traj_id),
            format!(
                "  rule_risk: {} score={} rules={:?}",
                self.risk.label, self.risk.score, rules
            ),
        ];
        match &self.explanation {
            None => lines.push("  llm_explanation: skipped (SAFE)".to_string()),
            Some(exp) => {
                lines.push(format!(
                    "  llm_label: {} confidence={}",
                    exp.label, exp.confidence
                ));
                lines.push(format!("  llm_reasons: {:?}", exp.reasons));
            }
        }
        lines
    }
}

/// A trajectory that produced no report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryFailure {
    pub traj_id: i64,
    pub error: String,
}

/// Corpus-wide record written next to the per-trajectory reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub reports: Vec<Report>,
    #[serde(default)]
    pub failures: Vec<TrajectoryFailure>,
}

impl ReportSummary {
    pub fn new(model: impl Into<String>, reports: Vec<Report>, failures: Vec<TrajectoryFailure>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            model: model.into(),
            reports,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RiskLabel, RuleId};

    fn features() -> FeatureRecord {
        FeatureRecord {
            goal_x: 0.0,
            goal_y: 0.0,
            d0: 1.0,
            d_t: 0.1,
            dmin: 0.1,
            progress: 0.9,
            heading_err_abs: 0.0,
            v_max: 0.3,
            omega_max: 0.2,
            omega_mean: 0.1,
            domega_max: 0.1,
            sample_count: 5,
        }
    }

    #[test]
    fn absent_explanation_serializes_as_null() {
        let report = Report::new(
            7,
            features(),
            RiskVerdict {
                label: RiskLabel::Safe,
                score: 0,
                rules: vec![RuleId::CloseToGoal, RuleId::HasProgress],
            },
            None,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["traj_id"], 7);
        assert!(json["explanation"].is_null());
        assert_eq!(json["risk"]["label"], "SAFE");
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let text = r#"{
            "traj_id": 3,
            "features": {"goal_x": 0, "goal_y": 0, "d0": 1, "dT": 1, "dmin": 1,
                         "progress": 0, "heading_err_abs": 0, "v_max": 0,
                         "omega_max": 0, "omega_mean": 0, "domega_max": 0, "T": 2},
            "rule_risk": {"label": "UNCERTAIN", "score": 4,
                          "rules": ["far_from_goal_end", "low_progress"]},
            "llm_explanation": {"label": "UNCERTAIN", "confidence": "low",
                                "reasons": ["x"], "_raw": "x"}
        }"#;
        let report: Report = serde_json::from_str(text).unwrap();
        assert_eq!(report.risk.label, RiskLabel::Uncertain);
        assert_eq!(report.features.sample_count, 2);
        assert_eq!(report.explanation.unwrap().raw.as_deref(), Some("x"));
    }

    #[test]
    fn summary_lines_mention_skip_for_safe() {
        let report = Report::new(
            1,
            features(),
            RiskVerdict {
                label: RiskLabel::Safe,
                score: 0,
                rules: vec![RuleId::CloseToGoal, RuleId::HasProgress],
            },
            None,
        );
        let lines = report.summary_lines();
        assert_eq!(lines[0], "traj_id=1");
        assert_eq!(
            lines[1],
            r#"  rule_risk: SAFE score=0 rules=["close_to_goal", "has_progress"]"#
        );
        assert_eq!(lines[2], "  llm_explanation: skipped (SAFE)");
    }
}
