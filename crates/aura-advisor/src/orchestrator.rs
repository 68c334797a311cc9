//! Model fallback and retry engine.
//!
//! ```text
//! for model in config.models (priority order, never reshuffled):
//!     for attempt in 0..=max_retries:
//!         dispatch → Ok(text)            → sanitize, return
//!                  → RateLimited         → next model now
//!                  → ModelUnavailable    → next model now
//!                  → Transient, retries left → sleep (attempt + 1) * base, retry
//!                  → Transient, no retries   → next model now
//! all failed → Exhausted(last error)
//! ```
//!
//! Runs are strictly sequential; models are never raced against each other.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::AdvisorConfig;
use crate::dispatcher::CompletionDispatcher;
use crate::errors::{ClassifiedError, ErrorKind};
use crate::sanitizer::sanitize;
use crate::types::Message;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait, then retry the same model.
    RetryAfter(Duration),
    /// Move on to the next model without waiting.
    NextModel,
    /// Stop the whole run.
    Abort,
}

/// Decision table for a failure of `kind` on 0-indexed `attempt`.
///
/// Pure function of the classification; no message inspection happens here.
pub fn decide(
    kind: ErrorKind,
    attempt: u32,
    max_retries: u32,
    backoff_base: Duration,
) -> RetryDecision {
    if kind.is_fatal() {
        RetryDecision::Abort
    } else if kind.skips_model() || attempt >= max_retries {
        RetryDecision::NextModel
    } else {
        RetryDecision::RetryAfter(backoff_base.saturating_mul(attempt + 1))
    }
}

/// Drives a [`CompletionDispatcher`] through the configured fallback chain.
pub struct FallbackOrchestrator<D> {
    dispatcher: D,
    config: AdvisorConfig,
}

impl<D: CompletionDispatcher> FallbackOrchestrator<D> {
    pub fn new(dispatcher: D, config: AdvisorConfig) -> Self {
        Self { dispatcher, config }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Complete `messages` with the configured retry count.
    pub async fn complete(
        &self,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<String, ClassifiedError> {
        self.complete_with_retries(messages, self.config.max_retries, max_tokens)
            .await
    }

    /// Complete `messages`, allowing `max_retries` extra attempts per model.
    ///
    /// Returns sanitized text from the first model that answers. When a total
    /// timeout is configured and elapses, the run ends as `Exhausted`.
    pub async fn complete_with_retries(
        &self,
        messages: &[Message],
        max_retries: u32,
        max_tokens: u32,
    ) -> Result<String, ClassifiedError> {
        if !self.config.has_credential() {
            warn!("completion requested without a usable credential");
            return Err(ClassifiedError::missing_credential());
        }

        let run = self.run_fallback_chain(messages, max_retries, max_tokens);
        match self.config.total_timeout() {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_secs = limit.as_secs(), "completion run timed out");
                    Err(ClassifiedError::exhausted(Some(ClassifiedError::new(
                        ErrorKind::Transient,
                        format!("no model answered within {}s", limit.as_secs()),
                    ))))
                }
            },
            None => run.await,
        }
    }

    async fn run_fallback_chain(
        &self,
        messages: &[Message],
        max_retries: u32,
        max_tokens: u32,
    ) -> Result<String, ClassifiedError> {
        let backoff_base = Duration::from_millis(self.config.backoff_base_ms);
        let mut last_err: Option<ClassifiedError> = None;

        'models: for (priority, model) in self.config.models.iter().enumerate() {
            for attempt in 0..=max_retries {
                debug!(model = %model, priority, attempt, "attempting completion");

                let err = match self.dispatcher.dispatch(messages, max_tokens, model).await {
                    Ok(raw) => {
                        info!(model = %model, attempt, "completion succeeded");
                        return Ok(sanitize(&raw));
                    }
                    Err(e) => e,
                };

                let decision = decide(err.kind, attempt, max_retries, backoff_base);
                match decision {
                    RetryDecision::Abort => {
                        warn!(model = %model, kind = %err.kind, error = %err.message, "aborting completion run");
                        return Err(err);
                    }
                    RetryDecision::NextModel => {
                        warn!(
                            model = %model,
                            attempt,
                            kind = %err.kind,
                            status = ?err.http_status,
                            error = %err.message,
                            "model failed, falling back to next model"
                        );
                        last_err = Some(err);
                        continue 'models;
                    }
                    RetryDecision::RetryAfter(backoff) => {
                        warn!(
                            model = %model,
                            attempt = attempt + 1,
                            max_retries,
                            ?backoff,
                            error = %err.message,
                            "transient error, retrying same model"
                        );
                        last_err = Some(err);
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        warn!(models = self.config.models.len(), "all models exhausted");
        Err(ClassifiedError::exhausted(last_err))
    }
}
