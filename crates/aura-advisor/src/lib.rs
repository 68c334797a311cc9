//! Resilient LLM advice orchestration for a women's health companion app.
//!
//! Turns a health question, a mood history or a computed risk assessment
//! into plain-text advice by calling an OpenAI-compatible completion
//! endpoint, tolerating rate limits, unavailable models and transient
//! network failures.
//!
//! ## Modules
//!
//! | Module         | Purpose                                               |
//! |----------------|-------------------------------------------------------|
//! | `advisor`      | Public entry points; never fail, fall back to text    |
//! | `orchestrator` | Ordered model fallback with per-model retry/backoff   |
//! | `dispatcher`   | One HTTP request to one model                         |
//! | `errors`       | `ClassifiedError` taxonomy and classification         |
//! | `prompts`      | Message builders for chat, mood and risk use cases    |
//! | `sanitizer`    | Markdown stripping for plain-text display             |
//! | `fallback`     | Localized last-resort advice                          |
//! | `config`       | Endpoint, credential and model-list configuration     |
//! | `types`        | Request-scoped domain types                           |

pub mod advisor;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod fallback;
pub mod orchestrator;
pub mod prompts;
pub mod sanitizer;
pub mod types;

pub use advisor::HealthAdvisor;
pub use config::AdvisorConfig;
pub use dispatcher::{CompletionDispatcher, HttpDispatcher};
pub use errors::{classify, ClassifiedError, ErrorKind};
pub use fallback::{fallback_text, FallbackKind};
pub use orchestrator::{decide, FallbackOrchestrator, RetryDecision};
pub use sanitizer::sanitize;
pub use types::{
    ConversationTurn, Language, Message, MoodEntry, RiskContext, RiskLevel, Role, SymptomDetails,
};
