//! crates/vocal_tales_core/src/narration.rs
//!
//! Language-code mapping for the speech-synthesis provider.

use crate::domain::Language;

/// Maps a story language to the synthesis provider's language code.
/// Unmapped input (the `auto` sentinel) falls back to English.
pub fn synthesis_language_code(language: Language) -> &'static str {
    match language {
        Language::Auto | Language::En => "en",
        Language::Es => "es",
        Language::Fr => "fr",
        Language::De => "de",
        Language::It => "it",
        Language::Pt => "pt",
        Language::Hi => "hi",
        Language::Zh => "zh",
        Language::Ja => "ja",
        Language::Ko => "ko",
        Language::Ar => "ar",
        Language::Ru => "ru",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_falls_back_to_english() {
        assert_eq!(synthesis_language_code(Language::Auto), "en");
    }

    #[test]
    fn supported_languages_map_to_their_own_code() {
        assert_eq!(synthesis_language_code(Language::Hi), "hi");
        assert_eq!(synthesis_language_code(Language::Zh), "zh");
        assert_eq!(synthesis_language_code(Language::Ru), "ru");
    }
}
