//! Static, pre-translated advice used when every model has failed.
//!
//! Pure lookups: no I/O, no failure modes.

use crate::types::{Language, RiskLevel};

/// Call site that needs last-resort text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// Open-ended health chat.
    Chat,
    /// Mood-pattern summary.
    Mood,
    /// Narration of a risk assessment at the given level.
    Risk(RiskLevel),
}

/// Fallback text for `kind` in `language`. Never empty.
pub fn fallback_text(kind: FallbackKind, language: Language) -> &'static str {
    match (kind, language) {
        (FallbackKind::Chat, Language::English) => {
            "I'm having trouble connecting right now. Please try again in a moment. \
             If you have severe pain, heavy bleeding or feel faint, contact your ASHA \
             worker or call 108 immediately."
        }
        (FallbackKind::Chat, Language::Hindi) => {
            "अभी कनेक्ट करने में समस्या हो रही है। कृपया थोड़ी देर बाद फिर से प्रयास करें। \
             अगर आपको तेज़ दर्द, अधिक रक्तस्राव या चक्कर आ रहे हैं, तो तुरंत अपनी आशा \
             कार्यकर्ता से संपर्क करें या 108 पर कॉल करें।"
        }
        (FallbackKind::Mood, Language::English) => {
            "We couldn't analyse your mood pattern right now. Keep logging your mood daily; \
             regular sleep, light exercise and talking to someone you trust can help."
        }
        (FallbackKind::Mood, Language::Hindi) => {
            "अभी आपके मूड पैटर्न का विश्लेषण नहीं हो सका। रोज़ अपना मूड दर्ज करते रहें; \
             नियमित नींद, हल्का व्यायाम और किसी भरोसेमंद व्यक्ति से बात करना मदद कर सकता है।"
        }
        (FallbackKind::Risk(RiskLevel::Low), Language::English) => {
            "Your risk level is LOW. Keep tracking your cycle and symptoms, eat iron-rich \
             food, stay hydrated and rest well. See a doctor if anything changes."
        }
        (FallbackKind::Risk(RiskLevel::Low), Language::Hindi) => {
            "आपका जोखिम स्तर कम है। अपने चक्र और लक्षणों को ट्रैक करते रहें, आयरन युक्त भोजन \
             लें, पर्याप्त पानी पिएं और आराम करें। कोई बदलाव हो तो डॉक्टर से मिलें।"
        }
        (FallbackKind::Risk(RiskLevel::Moderate), Language::English) => {
            "Your risk level is MODERATE. Monitor your symptoms closely and contact your \
             ASHA worker or local clinic if they persist or get worse."
        }
        (FallbackKind::Risk(RiskLevel::Moderate), Language::Hindi) => {
            "आपका जोखिम स्तर मध्यम है। अपने लक्षणों पर ध्यान रखें और अगर वे बने रहें या बढ़ें \
             तो अपनी आशा कार्यकर्ता या नज़दीकी क्लिनिक से संपर्क करें।"
        }
        (FallbackKind::Risk(RiskLevel::High), Language::English) => {
            "Your risk level is HIGH. Please consult a doctor as soon as possible. If you \
             have heavy bleeding, severe pain or feel faint, call 108 immediately."
        }
        (FallbackKind::Risk(RiskLevel::High), Language::Hindi) => {
            "आपका जोखिम स्तर उच्च है। कृपया जल्द से जल्द डॉक्टर से परामर्श करें। अगर अधिक \
             रक्तस्राव, तेज़ दर्द या चक्कर आ रहे हैं, तो तुरंत 108 पर कॉल करें।"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [FallbackKind; 5] = [
        FallbackKind::Chat,
        FallbackKind::Mood,
        FallbackKind::Risk(RiskLevel::Low),
        FallbackKind::Risk(RiskLevel::Moderate),
        FallbackKind::Risk(RiskLevel::High),
    ];

    #[test]
    fn every_combination_is_non_empty() {
        for kind in ALL_KINDS {
            for lang in [Language::English, Language::Hindi] {
                assert!(!fallback_text(kind, lang).trim().is_empty(), "{kind:?}/{lang:?}");
            }
        }
    }

    #[test]
    fn languages_differ() {
        for kind in ALL_KINDS {
            assert_ne!(
                fallback_text(kind, Language::English),
                fallback_text(kind, Language::Hindi)
            );
        }
    }

    #[test]
    fn risk_text_is_keyed_by_level() {
        assert!(fallback_text(FallbackKind::Risk(RiskLevel::High), Language::English)
            .contains("HIGH"));
        assert!(fallback_text(FallbackKind::Risk(RiskLevel::Low), Language::English)
            .contains("LOW"));
        assert!(fallback_text(FallbackKind::Risk(RiskLevel::High), Language::Hindi)
            .contains("उच्च"));
    }
}
