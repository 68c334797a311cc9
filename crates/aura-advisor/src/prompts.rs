//! Prompt builders for the three advice use cases.
//!
//! Each builder returns an ordered message sequence with the system message
//! first. Prompt versioning: bump `PROMPT_VERSION` whenever instruction text
//! changes, so logged responses can be traced to the prompt that produced them.

use std::borrow::Cow;

use crate::types::{
    ConversationTurn, Language, Message, MoodEntry, RiskContext, RiskLevel, SymptomDetails,
};

/// Prompt version. Bump on any instruction change.
pub const PROMPT_VERSION: &str = "1.3.0";

/// Token budget for open-ended health chat.
pub const HEALTH_ADVICE_MAX_TOKENS: u32 = 1024;
/// Token budget for the mood-pattern summary (40 words fit comfortably).
pub const MOOD_SUMMARY_MAX_TOKENS: u32 = 150;
/// Token budget for risk-assessment narration (250 words plus headings).
pub const SYMPTOM_ADVICE_MAX_TOKENS: u32 = 1200;

/// Rendered when a risk assessment raised no symptom or emergency flags.
pub const NO_CONCERNS_PHRASE: &str = "no specific concerns reported";

const MOOD_WORD_LIMIT: u32 = 40;
const SYMPTOM_WORD_LIMIT: u32 = 250;
/// Pain at or above this (0–10 scale) is moderate.
const PAIN_MODERATE_THRESHOLD: f64 = 5.0;
/// Pain at or above this is severe.
const PAIN_SEVERE_THRESHOLD: f64 = 8.0;

const HEALTH_ADVISOR_PREAMBLE: &str = "\
You are Aura, a friendly menstrual and reproductive health assistant for women in India, \
including rural users and ASHA community health workers. You give practical, safe, \
evidence-based guidance in plain words.";

const ENGLISH_INSTRUCTION: &str = "Respond in clear, simple English.";
const HINDI_INSTRUCTION: &str = "\
Respond only in simple Hindi written in Devanagari script, using everyday words a rural \
user would understand. Do not answer in English.";

const ENGLISH_DISCLAIMER: &str = "\
This is general guidance, not a medical diagnosis; please consult a doctor or your ASHA \
worker for personal advice.";
const HINDI_DISCLAIMER: &str = "\
यह सामान्य जानकारी है, चिकित्सकीय निदान नहीं; व्यक्तिगत सलाह के लिए कृपया डॉक्टर या अपनी आशा \
कार्यकर्ता से संपर्क करें।";

/// Behavioural constraints for the chat assistant; `{disclaimer}` is filled in.
const HEALTH_ADVICE_RULES: &str = "\
## Rules
- Never refuse to answer and never apologise. If a question is outside your scope, give \
  the most helpful safe guidance you can and suggest who to contact.
- Match the length of your answer to the question: one or two sentences for simple \
  questions, more detail only when the question needs it.
- For structured content such as steps or tips, put each item on its own line starting \
  with \"- \".
- Do not use markdown syntax: no headings, no bold, no italics, no code formatting, no tables.
- Do not start with a greeting and do not number your points.
- When the answer is about the user's health, end with exactly this sentence: {disclaimer}";

const MOOD_PREAMBLE: &str = "\
You are a supportive wellbeing assistant in a women's health app. You read a short mood \
log and point out the pattern in it.";

const SYMPTOM_PREAMBLE: &str = "\
You are a women's health assistant explaining the result of a health risk assessment \
that has already been computed. Do not recompute or question the risk level; explain it \
and give practical, safe guidance.";

// ── Shared pieces ───────────────────────────────────────────────────────────

fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::English => ENGLISH_INSTRUCTION,
        Language::Hindi => HINDI_INSTRUCTION,
    }
}

/// Closing sentence required on health-specific answers.
pub fn disclaimer(language: Language) -> &'static str {
    match language {
        Language::English => ENGLISH_DISCLAIMER,
        Language::Hindi => HINDI_DISCLAIMER,
    }
}

/// Confidence in `0.0..=1.0` as a rounded whole percentage.
fn confidence_percent(confidence: f64) -> i64 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as i64
}

/// One sentence telling the model which risk level to tailor advice to.
///
/// Optional confidence and grade are only mentioned when present.
pub fn risk_context_sentence(risk: &RiskContext) -> String {
    let mut qualifiers = Vec::new();
    if let Some(confidence) = risk.ml_confidence {
        qualifiers.push(format!(
            "model confidence {}%",
            confidence_percent(confidence)
        ));
    }
    if let Some(grade) = risk.health_grade.as_deref().map(str::trim) {
        if !grade.is_empty() {
            qualifiers.push(format!("health grade {grade}"));
        }
    }

    let qualifier = if qualifiers.is_empty() {
        String::new()
    } else {
        format!(" ({})", qualifiers.join(", "))
    };

    format!(
        "The user's latest health assessment shows a {} risk level{qualifier}. \
         Tailor your advice to this risk level.",
        risk.level
    )
}

// ── Health-advice chat ──────────────────────────────────────────────────────

/// Messages for an open-ended health question.
///
/// History turns are flattened oldest first, each as a user message followed
/// by an assistant message, and the current query comes last.
pub fn health_advice_messages(
    query: &str,
    history: &[ConversationTurn],
    language: Language,
    risk: Option<&RiskContext>,
) -> Vec<Message> {
    let mut system = vec![
        HEALTH_ADVISOR_PREAMBLE.to_string(),
        language_instruction(language).to_string(),
    ];
    if let Some(risk) = risk {
        system.push(risk_context_sentence(risk));
    }
    system.push(HEALTH_ADVICE_RULES.replace("{disclaimer}", disclaimer(language)));

    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(Message::system(system.join("\n\n")));
    for turn in history {
        messages.push(Message::user(turn.user_text.as_str()));
        messages.push(Message::assistant(turn.bot_text.as_str()));
    }
    messages.push(Message::user(query));
    messages
}

// ── Mood pattern ────────────────────────────────────────────────────────────

/// `date: mood` pairs joined by commas.
pub fn render_mood_log(entries: &[MoodEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}: {}", e.date.format("%Y-%m-%d"), e.mood.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Messages asking for a one-observation, one-tip mood summary.
pub fn mood_pattern_messages(entries: &[MoodEntry], language: Language) -> Vec<Message> {
    let system = format!(
        "{MOOD_PREAMBLE}\n\n{}\n\n\
         ## Rules\n\
         - Use at most {MOOD_WORD_LIMIT} words in total.\n\
         - Give exactly one observation about the mood pattern and exactly one actionable tip.\n\
         - No greeting, no header, no title, no markdown.",
        language_instruction(language)
    );

    let log = if entries.is_empty() {
        "no entries recorded yet".to_string()
    } else {
        render_mood_log(entries)
    };

    vec![
        Message::system(system),
        Message::user(format!("Mood log: {log}")),
    ]
}

// ── Risk-assessment narration ───────────────────────────────────────────────

/// Human-readable label for a symptom or emergency flag.
pub fn symptom_label(flag: &str) -> Cow<'static, str> {
    let label = match flag {
        "lowHb" | "low_hb" | "anaemia" | "anemia" => "low hemoglobin (anaemia)",
        "heavyBleeding" | "heavy_bleeding" => "heavy menstrual bleeding",
        "severeCramps" | "severe_cramps" => "severe menstrual cramps",
        "severePain" | "severe_pain" | "pelvicPain" | "pelvic_pain" => "severe pelvic pain",
        "irregularCycle" | "irregularCycles" | "irregular_cycle" => "irregular cycles",
        "missedPeriods" | "missed_periods" => "missed periods",
        "fever" => "fever",
        "discharge" | "unusualDischarge" | "unusual_discharge" => "unusual vaginal discharge",
        "fatigue" => "fatigue",
        "nausea" => "nausea",
        "headache" => "headache",
        "bloating" => "bloating",
        "moodSwings" | "mood_swings" => "mood swings",
        "dizziness" => "dizziness",
        "fainting" => "fainting or loss of consciousness",
        "breathlessness" | "shortnessOfBreath" => "shortness of breath",
        "chestPain" | "chest_pain" => "chest pain",
        "pregnancyBleeding" | "pregnancy_bleeding" => "bleeding during pregnancy",
        other => return Cow::Owned(humanize_flag(other)),
    };
    Cow::Borrowed(label)
}

/// `someFlag_name` → `some flag name`.
fn humanize_flag(flag: &str) -> String {
    let mut out = String::with_capacity(flag.len() + 4);
    for ch in flag.chars() {
        if ch == '_' || ch == '-' {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
        } else if ch.is_uppercase() {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out.trim().to_string()
}

/// Merged symptom and emergency flags as one comma-joined phrase.
pub fn describe_symptoms(risk: &RiskContext) -> String {
    let mut labels: Vec<Cow<'static, str>> = Vec::new();
    for flag in risk.active_flags() {
        let label = symptom_label(flag);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    if labels.is_empty() {
        NO_CONCERNS_PHRASE.to_string()
    } else {
        labels.join(", ")
    }
}

/// Pain band on the 0–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PainBand {
    Mild,
    Moderate,
    Severe,
}

impl PainBand {
    pub fn from_intensity(intensity: f64) -> Self {
        if intensity >= PAIN_SEVERE_THRESHOLD {
            Self::Severe
        } else if intensity >= PAIN_MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::Mild
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

/// Detail lines for the severity fields that are present, in fixed order.
pub fn detail_lines(details: &SymptomDetails) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(pain) = details.pain_intensity {
        lines.push(format!(
            "Pain intensity: {pain}/10 ({})",
            PainBand::from_intensity(pain).label()
        ));
    }
    let text_fields = [
        ("Bleeding level", &details.bleeding_level),
        ("Fatigue level", &details.fatigue_level),
        ("Symptom duration", &details.symptom_duration),
    ];
    for (label, value) in text_fields {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines
}

fn next_steps_instruction(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => {
            "Next steps: when to see a doctor and what to track. Because the risk is HIGH, \
             clearly say she should see a doctor or visit the nearest health centre \
             urgently, within 24 hours, and call 108 if symptoms become severe."
        }
        RiskLevel::Moderate | RiskLevel::Low => {
            "Next steps: when to see a doctor and what to keep tracking."
        }
    }
}

/// Messages asking the model to narrate a computed risk assessment.
pub fn symptom_advice_messages(risk: &RiskContext, language: Language) -> Vec<Message> {
    let system = format!(
        "{SYMPTOM_PREAMBLE}\n\n{}\n\n\
         ## Answer format\n\
         Answer in exactly these four sections, each starting with its title on its own line:\n\
         Risk summary: two sentences explaining what the risk level means for her.\n\
         Symptom guidance: for each reported symptom, one line of guidance followed by a \
         sub-bullet starting with \"To reduce intensity:\" giving one practical step.\n\
         OTC remedies: suggest only over-the-counter options available without a \
         prescription, with common dosing guidance; never suggest prescription medicines.\n\
         {}\n\n\
         ## Rules\n\
         - Keep the whole answer under {SYMPTOM_WORD_LIMIT} words.\n\
         - Use \"- \" for bullets. Do not use markdown headings, bold or italics.\n\
         - End with exactly this sentence: {}",
        language_instruction(language),
        next_steps_instruction(risk.level),
        disclaimer(language),
    );

    let mut assessment = vec![format!("Risk level: {} (score {})", risk.level, risk.score)];
    if let Some(confidence) = risk.ml_confidence {
        assessment.push(format!(
            "Model confidence: {}%",
            confidence_percent(confidence)
        ));
    }
    if let Some(grade) = risk.health_grade.as_deref().map(str::trim) {
        if !grade.is_empty() {
            assessment.push(format!("Health grade: {grade}"));
        }
    }
    assessment.push(format!("Reported symptoms: {}", describe_symptoms(risk)));
    if let Some(details) = &risk.details {
        assessment.extend(detail_lines(details));
    }

    vec![
        Message::system(system),
        Message::user(format!(
            "Here is my health assessment:\n{}",
            assessment.join("\n")
        )),
    ]
}
