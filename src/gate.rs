//! Decides whether a verdict needs an explanation and fetches one if so.

use serde_json::json;
use tracing::debug;

use crate::errors::{TrajSafeError, TrajSafeResult};
use crate::explainer::Explainer;
use crate::explanation::{parse_explanation, Explanation};
use crate::features::FeatureRecord;
use crate::rules::RiskVerdict;

/// Only non-SAFE verdicts are explained.
pub fn requires_explanation(verdict: &RiskVerdict) -> bool {
    !verdict.is_safe()
}

/// Template followed by the JSON input block the explainer reasons over.
pub fn build_prompt(
    template: &str,
    features: &FeatureRecord,
    verdict: &RiskVerdict,
) -> TrajSafeResult<String> {
    let payload = json!({
        "features": features,
        "rule_risk": verdict,
    });
    let rendered = serde_json::to_string_pretty(&payload)
        .map_err(|e| TrajSafeError::serialization("rendering prompt input", e))?;
    Ok(format!("{template}\n\nINPUT:\n{rendered}"))
}

pub struct ExplanationGate<'a> {
    template: &'a str,
    explainer: &'a dyn Explainer,
}

impl<'a> ExplanationGate<'a> {
    pub fn new(template: &'a str, explainer: &'a dyn Explainer) -> Self {
        Self {
            template,
            explainer,
        }
    }

    /// `Ok(None)` for SAFE verdicts, without touching the explainer.
    /// Explainer failures propagate unchanged.
    pub fn explain(
        &self,
        features: &FeatureRecord,
        verdict: &RiskVerdict,
    ) -> TrajSafeResult<Option<Explanation>> {
        if !requires_explanation(verdict) {
            debug!(label = %verdict.label, "explanation skipped");
            return Ok(None);
        }

        let prompt = build_prompt(self.template, features, verdict)?;
        let text = self.explainer.generate(&prompt)?;
        Ok(Some(parse_explanation(&text)))
    }
}
