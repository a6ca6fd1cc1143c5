//! crates/vocal_tales_core/src/language.rs
//!
//! Best-effort language detection over a small fixed vocabulary.
//! This is a keyword heuristic, not a statistical classifier; short or
//! mixed-language input may misclassify, and callers treat the result
//! as a default rather than a guarantee.

use crate::domain::Language;

/// Characteristic words and phrases per language: greetings, common
/// function words, yes/no. Matching is substring-based over the
/// lower-cased input, not word-boundary-aware. Single-letter function
/// words are space-padded; as bare substrings they match almost any
/// input and drown out every other table.
///
/// Slice order is the tie-break: languages are scored in this exact
/// order and the first strictly-highest scorer wins.
const LANGUAGE_PATTERNS: &[(Language, &[&str])] = &[
    (
        Language::Es,
        &[
            "hola", "gracias", "por favor", "sí", "no", "que", "el", "la", "de", "en", "un",
            "una",
        ],
    ),
    (
        Language::Fr,
        &[
            "bonjour", "merci", "oui", "non", "le", "la", "de", "et", "un", "une", "je", "tu",
        ],
    ),
    (
        Language::De,
        &[
            "hallo", "danke", "ja", "nein", "der", "die", "das", "und", "ich", "du", "ist",
        ],
    ),
    (
        Language::It,
        &[
            "ciao", "grazie", "sì", "il", "la", "di", " e ", "un", "una", "io", "tu",
        ],
    ),
    (
        Language::Pt,
        &[
            "olá", "obrigado", "sim", "não", " o ", " a ", "de", " e ", "um", "uma", "eu",
            "você",
        ],
    ),
    (
        Language::Hi,
        &["नमस्ते", "धन्यवाद", "हाँ", "नहीं", "क्या", "कैसे", "कहाँ", "कब"],
    ),
    (
        Language::Zh,
        &["你好", "谢谢", "是", "不", "什么", "怎么", "哪里", "什么时候"],
    ),
    (
        Language::Ja,
        &["こんにちは", "ありがとう", "はい", "いいえ", "何", "どう", "どこ", "いつ"],
    ),
    (
        Language::Ko,
        &["안녕하세요", "감사합니다", "네", "아니요", "무엇", "어떻게", "어디", "언제"],
    ),
    (
        Language::Ar,
        &["مرحبا", "شكرا", "نعم", "لا", "ما", "كيف", "أين", "متى"],
    ),
    (
        Language::Ru,
        &["привет", "спасибо", "да", "нет", "что", "как", "где", "когда"],
    ),
];

/// Guesses the language of `text` by counting keyword hits per language.
/// Returns `Language::En` when nothing matches at all.
pub fn detect_language(text: &str) -> Language {
    let text_lower = text.to_lowercase();

    let mut best = Language::En;
    let mut best_score = 0usize;

    for (language, keywords) in LANGUAGE_PATTERNS {
        let score = keywords.iter().filter(|kw| text_lower.contains(**kw)).count();
        if score > best_score {
            best = *language;
            best_score = score;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_defaults_to_english() {
        assert_eq!(detect_language(""), Language::En);
    }

    #[test]
    fn zero_matches_default_to_english() {
        assert_eq!(detect_language("zzz 12345"), Language::En);
    }

    #[test]
    fn detects_spanish_greeting() {
        assert_eq!(detect_language("Hola, ¿cómo estás?"), Language::Es);
    }

    #[test]
    fn detects_french() {
        assert_eq!(
            detect_language("Bonjour! Je voudrais une histoire, merci."),
            Language::Fr
        );
    }

    #[test]
    fn detects_german() {
        assert_eq!(
            detect_language("Hallo, ich möchte eine Geschichte, danke!"),
            Language::De
        );
    }

    #[test]
    fn detects_non_latin_scripts() {
        assert_eq!(detect_language("नमस्ते, धन्यवाद"), Language::Hi);
        assert_eq!(detect_language("你好，谢谢"), Language::Zh);
        assert_eq!(detect_language("こんにちは、ありがとう"), Language::Ja);
        assert_eq!(detect_language("안녕하세요 감사합니다"), Language::Ko);
        assert_eq!(detect_language("مرحبا شكرا"), Language::Ar);
        assert_eq!(detect_language("привет, спасибо"), Language::Ru);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(detect_language("HOLA GRACIAS"), Language::Es);
    }

    #[test]
    fn tie_breaks_on_evaluation_order() {
        // "un" scores 1 for Spanish, French and Italian alike; Spanish
        // is evaluated first and wins the tie.
        assert_eq!(detect_language("un"), Language::Es);
    }
}
