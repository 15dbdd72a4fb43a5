#![allow(dead_code)]

use std::cell::Cell;

use trajsafe::errors::{TrajSafeError, TrajSafeResult};
use trajsafe::explainer::Explainer;

pub const TEMPLATE: &str = "You are a robot safety analyst. Reply with JSON only.";

pub const HEADER: &str = "traj_id,t,x,y,theta,v,omega,goal_x,goal_y";

/// Three well-formed trajectories (SAFE, UNSAFE, UNCERTAIN) and one malformed one.
pub fn demo_csv() -> String {
    [
        HEADER,
        // 1: drives straight into the goal
        "1,0,0.0,0,0,0.5,0.0,2,0",
        "1,1,1.0,0,0,0.5,0.1,2,0",
        "1,2,1.9,0,0,0.5,0.0,2,0",
        // 2: spins in place far from the goal
        "2,0,0,0,0,0.0,0.0,5,5",
        "2,1,0,0,0,0.0,2.5,5,5",
        "2,2,0,0,0,0.0,-0.5,5,5",
        // 3: makes progress but stops short
        "3,0,0.0,0,0,0.4,0.0,3,0",
        "3,1,0.5,0,0,0.4,0.0,3,0",
        "3,2,1.0,0,0,0.4,0.0,3,0",
        // 4: corrupt position
        "4,0,oops,0,0,0.4,0.0,3,0",
    ]
    .join("\n")
        + "\n"
}

/// Explainer that agrees with the rule engine and cites every active rule.
pub struct AgreeingExplainer {
    pub calls: Cell<usize>,
}

impl AgreeingExplainer {
    pub fn new() -> Self {
        Self { calls: Cell::new(0) }
    }
}

impl Explainer for AgreeingExplainer {
    fn generate(&self, prompt: &str) -> TrajSafeResult<String> {
        self.calls.set(self.calls.get() + 1);

        let input = prompt
            .split("INPUT:\n")
            .nth(1)
            .expect("prompt carries an INPUT block");
        let payload: serde_json::Value = serde_json::from_str(input).expect("INPUT is JSON");
        let risk = &payload["rule_risk"];
        let reasons: Vec<String> = risk["rules"]
            .as_array()
            .expect("rules array")
            .iter()
            .map(|r| format!("[{}] triggered", r.as_str().unwrap_or_default()))
            .collect();

        Ok(serde_json::json!({
            "label": risk["label"],
            "confidence": "high",
            "reasons": reasons,
        })
        .to_string())
    }

    fn model(&self) -> &str {
        "agreeing"
    }
}

/// Explainer that always returns the same text.
pub struct FixedExplainer(pub &'static str);

impl Explainer for FixedExplainer {
    fn generate(&self, _prompt: &str) -> TrajSafeResult<String> {
        Ok(self.0.to_string())
    }

    fn model(&self) -> &str {
        "fixed"
    }
}

/// Explainer whose transport is down.
pub struct DownExplainer {
    pub calls: Cell<usize>,
}

impl DownExplainer {
    pub fn new() -> Self {
        Self { calls: Cell::new(0) }
    }
}

impl Explainer for DownExplainer {
    fn generate(&self, _prompt: &str) -> TrajSafeResult<String> {
        self.calls.set(self.calls.get() + 1);
        Err(TrajSafeError::external_service(
            "POST http://localhost:11434/api/generate",
            std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out"),
        ))
    }

    fn model(&self) -> &str {
        "down"
    }
}
