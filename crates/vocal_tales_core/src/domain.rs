//! crates/vocal_tales_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP representation;
//! only the small closed enums carry serde derives so their wire codes
//! are defined in exactly one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Words-per-minute reading speed used to estimate narration duration.
const READING_SPEED_WPM: u32 = 150;

/// Story genres a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Adventure,
    FairyTale,
    Educational,
    Bedtime,
    Mystery,
    Friendship,
}

impl Genre {
    /// Human-readable name, as shown to callers alongside the wire code.
    pub fn display_name(&self) -> &'static str {
        match self {
            Genre::Adventure => "Adventure",
            Genre::FairyTale => "Fairy Tale",
            Genre::Educational => "Educational",
            Genre::Bedtime => "Bedtime",
            Genre::Mystery => "Mystery",
            Genre::Friendship => "Friendship",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Genre::Adventure => "adventure",
            Genre::FairyTale => "fairy_tale",
            Genre::Educational => "educational",
            Genre::Bedtime => "bedtime",
            Genre::Mystery => "mystery",
            Genre::Friendship => "friendship",
        }
    }

    /// Parses a wire code, falling back to the default genre.
    pub fn from_code(code: &str) -> Genre {
        match code {
            "fairy_tale" => Genre::FairyTale,
            "educational" => Genre::Educational,
            "bedtime" => Genre::Bedtime,
            "mystery" => Genre::Mystery,
            "friendship" => Genre::Friendship,
            _ => Genre::Adventure,
        }
    }
}

impl Default for Genre {
    fn default() -> Self {
        Genre::Adventure
    }
}

/// Requested story length tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthTier {
    Short,
    Medium,
    Long,
}

impl LengthTier {
    pub fn display_name(&self) -> &'static str {
        match self {
            LengthTier::Short => "Short (3-5 min)",
            LengthTier::Medium => "Medium (5-8 min)",
            LengthTier::Long => "Long (8-12 min)",
        }
    }

    /// Target word-count range handed to the generation provider.
    pub fn word_range(&self) -> &'static str {
        match self {
            LengthTier::Short => "300-500 words",
            LengthTier::Medium => "500-800 words",
            LengthTier::Long => "800-1200 words",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LengthTier::Short => "short",
            LengthTier::Medium => "medium",
            LengthTier::Long => "long",
        }
    }

    /// Parses a wire code, falling back to the default tier.
    pub fn from_code(code: &str) -> LengthTier {
        match code {
            "short" => LengthTier::Short,
            "long" => LengthTier::Long,
            _ => LengthTier::Medium,
        }
    }
}

impl Default for LengthTier {
    fn default() -> Self {
        LengthTier::Medium
    }
}

/// Supported story languages, plus the `auto` sentinel meaning
/// "detect from the user's input text".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Auto,
    En,
    Es,
    Fr,
    De,
    It,
    Pt,
    Hi,
    Zh,
    Ja,
    Ko,
    Ar,
    Ru,
}

impl Language {
    /// The wire code (`auto` for the sentinel).
    pub fn code(&self) -> &'static str {
        match self {
            Language::Auto => "auto",
            Language::En => "en",
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

    /// Human-readable language name used inside generation prompts.
    /// The `auto` sentinel reads as English, the default story language.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Auto | Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
            Language::It => "Italian",
            Language::Pt => "Portuguese",
            Language::Hi => "Hindi",
            Language::Zh => "Chinese",
            Language::Ja => "Japanese",
            Language::Ko => "Korean",
            Language::Ar => "Arabic",
            Language::Ru => "Russian",
        }
    }

    /// Parses a wire code, treating anything unrecognized as `auto`
    /// so detection can take over.
    pub fn from_code(code: &str) -> Language {
        match code {
            "en" => Language::En,
            "es" => Language::Es,
            "fr" => Language::Fr,
            "de" => Language::De,
            "it" => Language::It,
            "pt" => Language::Pt,
            "hi" => Language::Hi,
            "zh" => Language::Zh,
            "ja" => Language::Ja,
            "ko" => Language::Ko,
            "ar" => Language::Ar,
            "ru" => Language::Ru,
            _ => Language::Auto,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Auto
    }
}

/// Lifecycle of a generated story. `Generating` is only the transient
/// initial value; a synchronous generation always ends in `Completed`
/// or `Failed`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Generating,
    Completed,
    Failed,
}

impl StoryStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            StoryStatus::Generating => "Generating",
            StoryStatus::Completed => "Completed",
            StoryStatus::Failed => "Failed",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoryStatus::Generating => "generating",
            StoryStatus::Completed => "completed",
            StoryStatus::Failed => "failed",
        }
    }

    /// Parses a stored status code. Unknown values read as `Generating`,
    /// the transient default.
    pub fn from_code(code: &str) -> StoryStatus {
        match code {
            "completed" => StoryStatus::Completed,
            "failed" => StoryStatus::Failed,
            _ => StoryStatus::Generating,
        }
    }
}

/// A child's listening profile. One per owning user.
#[derive(Debug, Clone)]
pub struct ChildProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// One of the fixed set 4..=12.
    pub age: i32,
    pub favorite_genres: Vec<Genre>,
    pub created_at: DateTime<Utc>,
}

/// The structured input describing one requested story.
///
/// Immutable after creation, except that `language` may be back-filled
/// from `auto` to a detected code before generation.
#[derive(Debug, Clone)]
pub struct StoryRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub voice_input: String,
    pub transcription: String,
    pub genre: Genre,
    pub length: LengthTier,
    pub language: Language,
    pub age_group: i32,
    pub characters: String,
    pub setting: String,
    pub moral_lesson: String,
    pub created_at: DateTime<Utc>,
}

impl StoryRequest {
    /// The user's raw input, preferring the voice transcript over the
    /// separately stored transcription when both are present.
    pub fn input_text(&self) -> &str {
        if !self.voice_input.is_empty() {
            &self.voice_input
        } else {
            &self.transcription
        }
    }
}

/// The persisted output of one generation attempt, success or failure.
/// Owned 1:1 by its `StoryRequest`.
#[derive(Debug, Clone)]
pub struct GeneratedStory {
    pub id: Uuid,
    pub request_id: Uuid,
    pub title: String,
    pub content: String,
    pub ai_model_used: String,
    pub status: StoryStatus,
    pub word_count: i32,
    /// Estimated narration time in seconds, derived from `word_count`.
    pub estimated_duration: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record of one listening occurrence against a generated story.
#[derive(Debug, Clone)]
pub struct StorySession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub story_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_listened: i32,
    /// 1..=5 when set.
    pub rating: Option<i32>,
}

/// A saved (owner, story) association. Unique per pair.
#[derive(Debug, Clone)]
pub struct FavoriteStory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub story_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

/// Computes the derived fields of a story body: whitespace-token word
/// count and the estimated narration duration in whole seconds at 150
/// words per minute. Invoked at every point a story body is written,
/// never as a hidden save-time side effect.
pub fn derive_reading_metrics(content: &str) -> (i32, i32) {
    let word_count = content.split_whitespace().count() as u32;
    let estimated_duration = word_count * 60 / READING_SPEED_WPM;
    (word_count as i32, estimated_duration as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_for_empty_body_are_zero() {
        assert_eq!(derive_reading_metrics(""), (0, 0));
        assert_eq!(derive_reading_metrics("   \n\t "), (0, 0));
    }

    #[test]
    fn metrics_count_whitespace_separated_tokens() {
        let (words, duration) = derive_reading_metrics("once upon a time");
        assert_eq!(words, 4);
        // 4 words / 150 wpm * 60 = 1.6s, integer-truncated.
        assert_eq!(duration, 1);
    }

    #[test]
    fn metrics_at_exactly_one_minute_of_reading() {
        let body = vec!["word"; 150].join(" ");
        assert_eq!(derive_reading_metrics(&body), (150, 60));
    }

    #[test]
    fn language_codes_round_trip() {
        for lang in [
            Language::En,
            Language::Es,
            Language::Fr,
            Language::De,
            Language::It,
            Language::Pt,
            Language::Hi,
            Language::Zh,
            Language::Ja,
            Language::Ko,
            Language::Ar,
            Language::Ru,
        ] {
            assert_eq!(Language::from_code(lang.code()), lang);
        }
        assert_eq!(Language::from_code("auto"), Language::Auto);
        assert_eq!(Language::from_code("tlh"), Language::Auto);
    }

    #[test]
    fn input_text_prefers_voice_over_transcription() {
        let mut request = StoryRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            voice_input: "a dragon story".to_string(),
            transcription: "something else".to_string(),
            genre: Genre::default(),
            length: LengthTier::default(),
            language: Language::default(),
            age_group: 6,
            characters: String::new(),
            setting: String::new(),
            moral_lesson: String::new(),
            created_at: Utc::now(),
        };
        assert_eq!(request.input_text(), "a dragon story");

        request.voice_input.clear();
        assert_eq!(request.input_text(), "something else");
    }
}
