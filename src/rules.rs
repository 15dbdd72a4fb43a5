//! Deterministic rule scoring over a [`FeatureRecord`].
//!
//! Rule order, score weights and label thresholds are part of the report
//! contract. Consumers rely on `rules` being in evaluation order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::features::FeatureRecord;

pub const CLOSE_TO_GOAL_MAX_DIST: f64 = 0.25;
pub const MIN_PROGRESS: f64 = 0.1;
/// Nominal angular rate limit of the platform, rad/s.
pub const OMEGA_LIMIT: f64 = 1.99;
pub const DOMEGA_JUMP_LIMIT: f64 = 1.5;
pub const FAR_FROM_GOAL_DIST: f64 = 0.5;
pub const BAD_HEADING_RAD: f64 = 1.0;

/// Highest score still labelled SAFE.
pub const SAFE_MAX_SCORE: u32 = 1;
/// Highest score still labelled UNCERTAIN.
pub const UNCERTAIN_MAX_SCORE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLabel {
    Safe,
    Uncertain,
    Unsafe,
}

impl RiskLabel {
    pub fn from_score(score: u32) -> Self {
        if score <= SAFE_MAX_SCORE {
            RiskLabel::Safe
        } else if score <= UNCERTAIN_MAX_SCORE {
            RiskLabel::Uncertain
        } else {
            RiskLabel::Unsafe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Safe => "SAFE",
            RiskLabel::Uncertain => "UNCERTAIN",
            RiskLabel::Unsafe => "UNSAFE",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a triggered rule, as it appears in reports and in
/// bracketed references (`[omega_too_high]`) inside explanations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    CloseToGoal,
    FarFromGoalEnd,
    LowProgress,
    HasProgress,
    OmegaTooHigh,
    HighOmegaJumps,
    BadHeadingFarFromGoal,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::CloseToGoal => "close_to_goal",
            RuleId::FarFromGoalEnd => "far_from_goal_end",
            RuleId::LowProgress => "low_progress",
            RuleId::HasProgress => "has_progress",
            RuleId::OmegaTooHigh => "omega_too_high",
            RuleId::HighOmegaJumps => "high_omega_jumps",
            RuleId::BadHeadingFarFromGoal => "bad_heading_far_from_goal",
        }
    }

    /// The form an explanation uses to cite this rule.
    pub fn bracketed(&self) -> String {
        format!("[{}]", self.as_str())
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule engine output for one trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub label: RiskLabel,
    pub score: u32,
    pub rules: Vec<RuleId>,
}

impl RiskVerdict {
    pub fn is_safe(&self) -> bool {
        self.label == RiskLabel::Safe
    }
}

struct Scorer {
    score: u32,
    rules: Vec<RuleId>,
}

impl Scorer {
    fn trigger(&mut self, rule: RuleId, weight: u32) {
        self.score += weight;
        self.rules.push(rule);
    }
}

/// Score a feature record. Pure and total.
pub fn rule_risk_label(f: &FeatureRecord) -> RiskVerdict {
    let mut s = Scorer {
        score: 0,
        rules: Vec::with_capacity(5),
    };

    // End close to goal
    if f.d_t <= CLOSE_TO_GOAL_MAX_DIST {
        s.trigger(RuleId::CloseToGoal, 0);
    } else {
        s.trigger(RuleId::FarFromGoalEnd, 2);
    }

    // Must show progress
    if f.progress < MIN_PROGRESS {
        s.trigger(RuleId::LowProgress, 2);
    } else {
        s.trigger(RuleId::HasProgress, 0);
    }

    if f.omega_max > OMEGA_LIMIT {
        s.trigger(RuleId::OmegaTooHigh, 2);
    }

    if f.domega_max > DOMEGA_JUMP_LIMIT {
        s.trigger(RuleId::HighOmegaJumps, 1);
    }

    // Bad heading while still far
    if f.d_t > FAR_FROM_GOAL_DIST && f.heading_err_abs > BAD_HEADING_RAD {
        s.trigger(RuleId::BadHeadingFarFromGoal, 1);
    }

    RiskVerdict {
        label: RiskLabel::from_score(s.score),
        score: s.score,
        rules: s.rules,
    }
}
