//! Public entry points: chat advice, mood summary, risk narration.
//!
//! Every entry point resolves to display-ready text. Orchestrator failures
//! and empty completions are replaced by localized fallback text and never
//! reach the caller.

use tracing::{info, warn};

use crate::config::AdvisorConfig;
use crate::dispatcher::{CompletionDispatcher, HttpDispatcher};
use crate::errors::ClassifiedError;
use crate::fallback::{fallback_text, FallbackKind};
use crate::orchestrator::FallbackOrchestrator;
use crate::prompts::{
    self, HEALTH_ADVICE_MAX_TOKENS, MOOD_SUMMARY_MAX_TOKENS, SYMPTOM_ADVICE_MAX_TOKENS,
};
use crate::types::{ConversationTurn, Language, Message, MoodEntry, RiskContext};

/// Health advice service over a completion backend.
pub struct HealthAdvisor<D> {
    orchestrator: FallbackOrchestrator<D>,
}

impl HealthAdvisor<HttpDispatcher> {
    /// Advisor backed by the HTTP endpoint named in `config`.
    pub fn from_config(config: AdvisorConfig) -> Result<Self, ClassifiedError> {
        let dispatcher = HttpDispatcher::from_config(&config)?;
        Ok(Self::new(FallbackOrchestrator::new(dispatcher, config)))
    }
}

impl<D: CompletionDispatcher> HealthAdvisor<D> {
    pub fn new(orchestrator: FallbackOrchestrator<D>) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &FallbackOrchestrator<D> {
        &self.orchestrator
    }

    /// Answer a free-form health question, optionally tailored to a risk result.
    pub async fn generate_health_advice(
        &self,
        query: &str,
        history: &[ConversationTurn],
        language: Language,
        risk: Option<&RiskContext>,
    ) -> String {
        let messages = prompts::health_advice_messages(query, history, language, risk);
        self.complete_or_fallback(
            "health_advice",
            &messages,
            HEALTH_ADVICE_MAX_TOKENS,
            FallbackKind::Chat,
            language,
        )
        .await
    }

    /// Summarize a mood history as one observation plus one tip.
    pub async fn summarize_mood_patterns(&self, entries: &[MoodEntry], language: Language) -> String {
        let messages = prompts::mood_pattern_messages(entries, language);
        self.complete_or_fallback(
            "mood_summary",
            &messages,
            MOOD_SUMMARY_MAX_TOKENS,
            FallbackKind::Mood,
            language,
        )
        .await
    }

    /// Narrate a computed risk assessment with per-symptom guidance.
    pub async fn generate_symptom_advice(&self, risk: &RiskContext, language: Language) -> String {
        let messages = prompts::symptom_advice_messages(risk, language);
        self.complete_or_fallback(
            "symptom_advice",
            &messages,
            SYMPTOM_ADVICE_MAX_TOKENS,
            FallbackKind::Risk(risk.level),
            language,
        )
        .await
    }

    async fn complete_or_fallback(
        &self,
        use_case: &'static str,
        messages: &[Message],
        max_tokens: u32,
        fallback: FallbackKind,
        language: Language,
    ) -> String {
        match self.orchestrator.complete(messages, max_tokens).await {
            Ok(text) if !text.trim().is_empty() => {
                info!(
                    use_case,
                    prompt_version = prompts::PROMPT_VERSION,
                    chars = text.len(),
                    "advice generated"
                );
                text
            }
            Ok(_) => {
                warn!(use_case, "model returned empty advice, using fallback text");
                fallback_text(fallback, language).to_string()
            }
            Err(e) => {
                warn!(
                    use_case,
                    kind = %e.kind,
                    last_kind = ?e.last_kind,
                    error = %e.message,
                    language = language.code(),
                    "advice generation failed, using fallback text"
                );
                fallback_text(fallback, language).to_string()
            }
        }
    }
}
