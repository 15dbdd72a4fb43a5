//! Structured explanations and the total parser that produces them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

pub const FALLBACK_LABEL: &str = "UNCERTAIN";
pub const FALLBACK_CONFIDENCE: &str = "low";
pub const FALLBACK_REASON: &str = "LLM did not return valid JSON.";

/// Rationale attached to a non-SAFE verdict.
///
/// `raw` is only set on the fallback, where it keeps the text the explainer
/// actually returned.
///
/// Decoding is lenient so persisted corpora from older runs stay auditable:
/// missing fields become empty, and non-string values are kept as their JSON
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(default, deserialize_with = "lenient_text")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub confidence: String,
    #[serde(default, deserialize_with = "lenient_texts")]
    pub reasons: Vec<String>,
    #[serde(default, alias = "_raw", skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Shape the explainer is asked to return. Unknown keys are ignored.
#[derive(Deserialize)]
struct ExplanationPayload {
    label: String,
    #[serde(deserialize_with = "scalar_text")]
    confidence: String,
    reasons: Vec<String>,
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_text(Value::deserialize(d)?))
}

fn lenient_texts<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items.into_iter().map(value_text).collect(),
        Value::Null => Vec::new(),
        other => vec![value_text(other)],
    })
}

/// Models often answer `"confidence": 0.9`; any scalar is kept as text.
fn scalar_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::Array(_) | Value::Object(_) => Err(serde::de::Error::custom(
            "confidence must be a scalar",
        )),
        other => Ok(value_text(other)),
    }
}

impl Explanation {
    /// Explanation used whenever the explainer output cannot be parsed.
    pub fn fallback(raw: impl Into<String>) -> Self {
        Self {
            label: FALLBACK_LABEL.to_string(),
            confidence: FALLBACK_CONFIDENCE.to_string(),
            reasons: vec![FALLBACK_REASON.to_string()],
            raw: Some(raw.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.raw.is_some()
    }
}

/// Interpret explainer text as an [`Explanation`]. Never fails.
pub fn parse_explanation(text: &str) -> Explanation {
    // serde would also accept a positional array for the payload struct
    let parsed = serde_json::from_str::<serde_json::Value>(text.trim()).and_then(|value| {
        if value.is_object() {
            serde_json::from_value::<ExplanationPayload>(value)
        } else {
            Err(serde::de::Error::custom("explanation must be a JSON object"))
        }
    });
    match parsed {
        Ok(payload) => Explanation {
            label: payload.label,
            confidence: payload.confidence,
            reasons: payload.reasons,
            raw: None,
        },
        Err(err) => {
            debug!(error = %err, "explainer output is not a valid explanation, using fallback");
            Explanation::fallback(text)
        }
    }
}
