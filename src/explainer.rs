//! The external text-generation capability.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config_loader::ExplainerConfig;
use crate::errors::{TrajSafeError, TrajSafeResult};

/// Anything that can turn a prompt into free text.
///
/// Implementations may block. Failures must be reported as
/// [`TrajSafeError::ExternalService`]; callers do not retry.
pub trait Explainer {
    fn generate(&self, prompt: &str) -> TrajSafeResult<String>;

    /// Identifier of the model behind this explainer, recorded in summaries.
    fn model(&self) -> &str;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Explainer backed by an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaExplainer {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
}

impl OllamaExplainer {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout: Duration) -> TrajSafeResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrajSafeError::external_service("building http client", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
        })
    }

    pub fn from_config(cfg: &ExplainerConfig) -> TrajSafeResult<Self> {
        Self::new(
            cfg.endpoint.clone(),
            cfg.model.clone(),
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Explainer for OllamaExplainer {
    fn generate(&self, prompt: &str) -> TrajSafeResult<String> {
        debug!(endpoint = %self.endpoint, model = %self.model, prompt_len = prompt.len(), "calling explainer");

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| TrajSafeError::external_service(format!("POST {}", self.endpoint), e))?;

        let data: GenerateResponse = response
            .json()
            .map_err(|e| TrajSafeError::external_service("decoding generate response", e))?;

        Ok(data.response.unwrap_or_default().trim().to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
