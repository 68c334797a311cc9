//! Single-request completion dispatch.
//!
//! A dispatcher performs exactly one HTTP round-trip to one model and
//! returns the raw completion text or a [`ClassifiedError`]. Retries and
//! model fallback are the orchestrator's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AdvisorConfig;
use crate::errors::ClassifiedError;
use crate::types::Message;

/// Abstraction over completion backends.
///
/// `HttpDispatcher` implements this for OpenAI-compatible endpoints.
/// Tests can provide a scripted implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionDispatcher: Send + Sync {
    /// Send `messages` to `model` and return the completion text.
    async fn dispatch(
        &self,
        messages: &[Message],
        max_tokens: u32,
        model: &str,
    ) -> Result<String, ClassifiedError>;
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    /// Null when the provider returns no text.
    #[serde(default)]
    content: Option<String>,
}

/// Provider error envelope: `{ "error": { "message": "..." } }`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Extract the completion text from a success body.
///
/// Missing choices or null content yield an empty string.
fn completion_text(body: &str) -> Result<String, ClassifiedError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| {
        ClassifiedError::from_response(None, format!("invalid completion body: {e}"))
    })?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default())
}

/// Build the error for a non-success status, preferring the provider's message.
fn error_for_status(status: u16, body: &str) -> ClassifiedError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"));
    ClassifiedError::from_response(Some(status), message)
}

// ── HTTP implementation ─────────────────────────────────────────────────────

/// Dispatcher for OpenAI-compatible chat-completions endpoints.
pub struct HttpDispatcher {
    client: reqwest::Client,
    endpoint_url: String,
    api_key: String,
    temperature: f64,
    has_credential: bool,
}

impl HttpDispatcher {
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, ClassifiedError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                ClassifiedError::from_response(None, format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
            api_key: config.api_key.trim().to_string(),
            temperature: config.temperature,
            has_credential: config.has_credential(),
        })
    }
}

#[async_trait]
impl CompletionDispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        messages: &[Message],
        max_tokens: u32,
        model: &str,
    ) -> Result<String, ClassifiedError> {
        if !self.has_credential {
            return Err(ClassifiedError::missing_credential());
        }

        let request = ChatRequest {
            model,
            messages,
            max_tokens,
            temperature: self.temperature,
        };

        debug!(model, messages = messages.len(), max_tokens, "dispatching completion");

        let response = self
            .client
            .post(&self.endpoint_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifiedError::from_response(None, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassifiedError::from_response(None, e.to_string()))?;

        if !status.is_success() {
            return Err(error_for_status(status.as_u16(), &body));
        }

        completion_text(&body)
    }
}
