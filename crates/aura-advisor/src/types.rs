//! Request-scoped domain types shared by the prompt builders, the orchestrator
//! and the advisor facade.
//!
//! ## Key types
//!
//! | Type               | Produced by           | Consumed by                  |
//! |--------------------|-----------------------|------------------------------|
//! | `Message`          | Prompt builders       | Orchestrator, dispatcher     |
//! | `ConversationTurn` | Chat screen (caller)  | Health-advice builder        |
//! | `RiskContext`      | Risk engine (caller)  | Health/symptom builders      |
//! | `MoodEntry`        | Mood tracker (caller) | Mood-pattern builder         |
//! | `Language`         | Caller language code  | Builders, fallback provider  |
//!
//! Nothing here is persisted or shared between requests.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Messages ────────────────────────────────────────────────────────────────

/// Author of a chat message on the completion wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the ordered completion payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One prior chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub user_text: String,
    pub bot_text: String,
}

impl ConversationTurn {
    pub fn new(user_text: impl Into<String>, bot_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            bot_text: bot_text.into(),
        }
    }
}

// ── Language ────────────────────────────────────────────────────────────────

/// Output language for prompts and fallback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    /// Parse a language code; anything that is not Hindi is English.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_ascii_lowercase();
        if code == "hi" || code.starts_with("hi-") || code.starts_with("hi_") || code == "hindi" {
            Self::Hindi
        } else {
            Self::English
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
        }
    }
}

// ── Risk assessment ─────────────────────────────────────────────────────────

/// Risk band computed by the upstream risk engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "LOW", alias = "Low", alias = "low")]
    Low,
    #[serde(
        rename = "MODERATE",
        alias = "MEDIUM",
        alias = "Moderate",
        alias = "Medium",
        alias = "moderate",
        alias = "medium"
    )]
    Moderate,
    #[serde(rename = "HIGH", alias = "High", alias = "high")]
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Optional severity fields reported alongside the symptom flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomDetails {
    /// Pain on a 0–10 scale.
    pub pain_intensity: Option<f64>,
    pub bleeding_level: Option<String>,
    pub fatigue_level: Option<String>,
    pub symptom_duration: Option<String>,
}

impl SymptomDetails {
    pub fn is_empty(&self) -> bool {
        self.pain_intensity.is_none()
            && self.bleeding_level.is_none()
            && self.fatigue_level.is_none()
            && self.symptom_duration.is_none()
    }
}

/// Read-only output of the external risk assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskContext {
    pub level: RiskLevel,
    #[serde(default)]
    pub score: f64,
    /// Model confidence in `0.0..=1.0`.
    #[serde(default)]
    pub ml_confidence: Option<f64>,
    #[serde(default)]
    pub health_grade: Option<String>,
    #[serde(default)]
    pub symptoms: BTreeMap<String, bool>,
    #[serde(default)]
    pub emergency: BTreeMap<String, bool>,
    #[serde(default)]
    pub details: Option<SymptomDetails>,
}

impl RiskContext {
    pub fn new(level: RiskLevel, score: f64) -> Self {
        Self {
            level,
            score,
            ml_confidence: None,
            health_grade: None,
            symptoms: BTreeMap::new(),
            emergency: BTreeMap::new(),
            details: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.ml_confidence = Some(confidence);
        self
    }

    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.health_grade = Some(grade.into());
        self
    }

    pub fn with_symptom(mut self, flag: impl Into<String>) -> Self {
        self.symptoms.insert(flag.into(), true);
        self
    }

    pub fn with_emergency(mut self, flag: impl Into<String>) -> Self {
        self.emergency.insert(flag.into(), true);
        self
    }

    pub fn with_details(mut self, details: SymptomDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Raised flags from `symptoms` then `emergency`, without duplicates.
    pub fn active_flags(&self) -> Vec<&str> {
        let mut flags: Vec<&str> = Vec::new();
        for (flag, on) in self.symptoms.iter().chain(self.emergency.iter()) {
            if *on && !flags.contains(&flag.as_str()) {
                flags.push(flag.as_str());
            }
        }
        flags
    }
}

// ── Mood history ────────────────────────────────────────────────────────────

/// One day of the mood tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub date: NaiveDate,
    pub mood: String,
}

impl MoodEntry {
    pub fn new(date: NaiveDate, mood: impl Into<String>) -> Self {
        Self {
            date,
            mood: mood.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_codes() {
        assert_eq!(Language::from_code("hi"), Language::Hindi);
        assert_eq!(Language::from_code("HI-in"), Language::Hindi);
        assert_eq!(Language::from_code("en"), Language::English);
        assert_eq!(Language::from_code(""), Language::English);
        assert_eq!(Language::from_code("fr"), Language::English);
        assert_eq!(Language::Hindi.code(), "hi");
    }

    #[test]
    fn message_serializes_lowercase_role() {
        let json = serde_json::to_value(Message::assistant("ok")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "ok");
    }

    #[test]
    fn risk_context_from_upstream_json() {
        let raw = r#"{
            "level": "HIGH",
            "score": 72,
            "mlConfidence": 0.874,
            "healthGrade": "C",
            "symptoms": { "lowHb": true, "fatigue": false },
            "emergency": { "fainting": true },
            "details": { "painIntensity": 7, "symptomDuration": "3 days" }
        }"#;
        let ctx: RiskContext = serde_json::from_str(raw).unwrap();
        assert_eq!(ctx.level, RiskLevel::High);
        assert_eq!(ctx.ml_confidence, Some(0.874));
        assert_eq!(ctx.health_grade.as_deref(), Some("C"));
        assert_eq!(ctx.active_flags(), vec!["lowHb", "fainting"]);
        let details = ctx.details.unwrap();
        assert_eq!(details.pain_intensity, Some(7.0));
        assert!(details.bleeding_level.is_none());
    }

    #[test]
    fn medium_is_an_alias_for_moderate() {
        let ctx: RiskContext = serde_json::from_str(r#"{"level":"MEDIUM"}"#).unwrap();
        assert_eq!(ctx.level, RiskLevel::Moderate);
        assert!(ctx.symptoms.is_empty());
        assert!(ctx.active_flags().is_empty());
    }

    #[test]
    fn active_flags_are_deduplicated() {
        let ctx = RiskContext::new(RiskLevel::Low, 10.0)
            .with_symptom("heavyBleeding")
            .with_emergency("heavyBleeding")
            .with_emergency("fainting");
        assert_eq!(ctx.active_flags(), vec!["heavyBleeding", "fainting"]);
    }

    #[test]
    fn empty_details() {
        assert!(SymptomDetails::default().is_empty());
    }

    #[test]
    fn conversation_turn_uses_camel_case() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"userText":"hi","botText":"hello"}"#).unwrap();
        assert_eq!(turn, ConversationTurn::new("hi", "hello"));
    }
}
