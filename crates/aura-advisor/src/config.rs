//! Completion endpoint and fallback-chain configuration.
//!
//! Built once at startup and handed to the orchestrator; never mutated
//! afterwards.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Values in a TOML file passed to [`AdvisorConfig::from_file`]
//! 2. Environment variables (`AURA_API_KEY`, `AURA_MODELS`, ...)
//! 3. Built-in defaults (OpenRouter, three free-tier models)

use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible chat-completions URL.
const DEFAULT_COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// Fallback order: first entry is tried first.
const DEFAULT_MODELS: &[&str] = &[
    "google/gemini-2.0-flash-exp:free",
    "meta-llama/llama-3.3-70b-instruct:free",
    "mistralai/mistral-7b-instruct:free",
];
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Backoff unit: attempt `n` (0-indexed) waits `(n + 1) * base`.
const DEFAULT_BACKOFF_BASE_MS: u64 = 2_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Credentials shorter than this are treated as absent.
pub const MIN_CREDENTIAL_LEN: usize = 20;

const ENV_API_KEY: &str = "AURA_API_KEY";
const ENV_COMPLETIONS_URL: &str = "AURA_COMPLETIONS_URL";
const ENV_MODELS: &str = "AURA_MODELS";
const ENV_MAX_RETRIES: &str = "AURA_MAX_RETRIES";

/// Read-only configuration consumed by the dispatcher and orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Full chat-completions URL.
    pub endpoint_url: String,
    /// Bearer credential. Empty means not configured.
    pub api_key: String,
    /// Model identifiers in fallback priority order.
    pub models: Vec<String>,
    /// Extra attempts per model after the first one.
    pub max_retries: u32,
    pub temperature: f64,
    pub backoff_base_ms: u64,
    pub request_timeout_secs: u64,
    /// Ceiling on one whole orchestrated run. `None` keeps runs unbounded.
    pub total_timeout_secs: Option<u64>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            endpoint_url: env::var(ENV_COMPLETIONS_URL)
                .unwrap_or_else(|_| DEFAULT_COMPLETIONS_URL.to_string()),
            api_key: env::var(ENV_API_KEY).unwrap_or_default(),
            models: env::var(ENV_MODELS)
                .ok()
                .map(|raw| parse_model_list(&raw))
                .filter(|models| !models.is_empty())
                .unwrap_or_else(default_models),
            max_retries: env::var(ENV_MAX_RETRIES)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_RETRIES),
            temperature: DEFAULT_TEMPERATURE,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            total_timeout_secs: None,
        }
    }
}

impl AdvisorConfig {
    /// Build from environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Load a TOML file; keys it omits keep their environment/default values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AdvisorConfig =
            toml::from_str(content).context("Failed to parse advisor config TOML")?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Set the credential and model list explicitly (tests, embedding apps).
    pub fn with_credentials(api_key: impl Into<String>, models: Vec<String>) -> Self {
        Self {
            api_key: api_key.into(),
            models,
            ..Self::default()
        }
    }

    /// `true` if the credential is long enough to be a real key.
    pub fn has_credential(&self) -> bool {
        self.api_key.trim().len() >= MIN_CREDENTIAL_LEN
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn total_timeout(&self) -> Option<Duration> {
        self.total_timeout_secs.map(Duration::from_secs)
    }

    /// Validate the config; return an error string if invalid.
    ///
    /// A missing credential is not a config error: it surfaces per request
    /// as `MissingCredential` so callers still get fallback text.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint_url.trim().is_empty() {
            return Err("endpoint_url must not be empty".to_string());
        }
        if self.models.iter().any(|m| m.trim().is_empty()) {
            return Err("model identifiers must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be in [0, 2], got {}",
                self.temperature
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be > 0".to_string());
        }
        if self.total_timeout_secs == Some(0) {
            return Err("total_timeout_secs must be > 0 when set".to_string());
        }
        Ok(())
    }
}

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

/// Split a comma-separated model list, dropping blanks.
fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let cfg = AdvisorConfig::default();
        cfg.validate().expect("default config should be valid");
        assert!(!cfg.models.is_empty());
    }

    #[test]
    fn short_credential_is_absent() {
        let cfg = AdvisorConfig::with_credentials("too-short", vec!["m".into()]);
        assert!(!cfg.has_credential());
        let cfg = AdvisorConfig::with_credentials("sk-or-v1-0123456789abcdef", vec!["m".into()]);
        assert!(cfg.has_credential());
    }

    #[test]
    fn model_list_parsing() {
        assert_eq!(
            parse_model_list(" a/b:free, ,c/d "),
            vec!["a/b:free".to_string(), "c/d".to_string()]
        );
        assert!(parse_model_list(" , ").is_empty());
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let cfg = AdvisorConfig::from_toml_str(
            r#"
            models = ["first", "second"]
            max_retries = 1
            total_timeout_secs = 45
            "#,
        )
        .unwrap();
        assert_eq!(cfg.models, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(cfg.max_retries, 1);
        assert_eq!(cfg.total_timeout(), Some(Duration::from_secs(45)));
        assert_eq!(cfg.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut cfg = AdvisorConfig::default();
        cfg.temperature = 3.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_total_timeout_rejected() {
        let err = AdvisorConfig::from_toml_str("total_timeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("total_timeout_secs"), "{err}");
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("advisor.toml");
        std::fs::write(&path, "endpoint_url = \"http://localhost:9/v1/chat/completions\"\n")
            .unwrap();
        let cfg = AdvisorConfig::from_file(&path).unwrap();
        assert_eq!(cfg.endpoint_url, "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn from_file_missing_path_errors() {
        let err = AdvisorConfig::from_file(Path::new("/nonexistent/advisor.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"), "{err}");
    }
}
