use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::errors::{TrajSafeError, TrajSafeResult};

pub const DEFAULT_CONFIG_FILE: &str = "trajsafe.toml";
pub const CONFIG_PATH_ENV: &str = "TRAJSAFE_CONFIG";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExplainerConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "mistral:latest".to_string(),
            timeout_secs: 120,
        }
    }
}

/// What the pipeline does when the explainer fails for one trajectory.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure, skip that trajectory's report, keep going.
    #[default]
    Isolate,
    /// Stop the run at the first failure.
    Abort,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TrajSafeConfig {
    pub output_dir: PathBuf,
    pub prompt_path: PathBuf,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub explainer: ExplainerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TrajSafeConfig {
    fn default() -> Self {
        TrajSafeConfig {
            output_dir: PathBuf::from("outputs"),
            prompt_path: PathBuf::from("prompts/safety_analyst.txt"),
            failure_policy: FailurePolicy::default(),
            log_level: default_log_level(),
            explainer: ExplainerConfig::default(),
        }
    }
}

impl TrajSafeConfig {
    pub fn validate(&self) -> TrajSafeResult<()> {
        if self.explainer.model.trim().is_empty() {
            return Err(TrajSafeError::config("explainer.model must be set"));
        }
        if self.explainer.endpoint.trim().is_empty() {
            return Err(TrajSafeError::config("explainer.endpoint must be set"));
        }
        if self.explainer.timeout_secs == 0 {
            return Err(TrajSafeError::config("explainer.timeout_secs must be positive"));
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(TrajSafeError::config(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }
        Ok(())
    }
}

/// Defaults, then the TOML file, then `TRAJSAFE_*` environment variables.
pub fn figment() -> Figment {
    let file = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    Figment::from(Serialized::defaults(TrajSafeConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed("TRAJSAFE_").ignore(&["config"]).split("__"))
}

pub fn load_config() -> TrajSafeResult<TrajSafeConfig> {
    let config: TrajSafeConfig = figment().extract()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_sources() {
        Jail::expect_with(|_jail| {
            let cfg = load_config().map_err(|e| e.to_string())?;
            assert_eq!(cfg, TrajSafeConfig::default());
            assert_eq!(cfg.failure_policy, FailurePolicy::Isolate);
            assert_eq!(cfg.explainer.timeout_secs, 120);
            Ok(())
        });
    }

    #[test]
    fn toml_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "trajsafe.toml",
                r#"
                output_dir = "reports"
                failure_policy = "abort"

                [explainer]
                model = "llama3:8b"
                timeout_secs = 30
                "#,
            )?;
            jail.set_env("TRAJSAFE_EXPLAINER__MODEL", "phi3:mini");

            let cfg = load_config().map_err(|e| e.to_string())?;
            assert_eq!(cfg.output_dir, PathBuf::from("reports"));
            assert_eq!(cfg.failure_policy, FailurePolicy::Abort);
            assert_eq!(cfg.explainer.model, "phi3:mini");
            assert_eq!(cfg.explainer.timeout_secs, 30);
            assert_eq!(cfg.explainer.endpoint, ExplainerConfig::default().endpoint);
            Ok(())
        });
    }

    #[test]
    fn config_path_can_be_redirected() {
        Jail::expect_with(|jail| {
            jail.create_file("alt.toml", "log_level = \"debug\"")?;
            jail.set_env(CONFIG_PATH_ENV, "alt.toml");

            let cfg = load_config().map_err(|e| e.to_string())?;
            assert_eq!(cfg.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn zero_timeout_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("TRAJSAFE_EXPLAINER__TIMEOUT_SECS", "0");
            let err = load_config().unwrap_err();
            assert!(err.to_string().contains("timeout_secs"));
            Ok(())
        });
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let cfg = TrajSafeConfig {
            log_level: "loud".to_string(),
            ..TrajSafeConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
