//! crates/vocal_tales_core/src/prompt.rs
//!
//! Turns a structured story request into the natural-language
//! instruction block sent to the generation provider.

use crate::domain::StoryRequest;

/// Builds the provider prompt for one story request. Pure and
/// infallible: every well-formed request produces a string, including
/// one where all optional fields are empty.
pub fn build_story_prompt(request: &StoryRequest) -> String {
    let language_name = request.language.display_name();

    let mut prompt = format!(
        "\nCreate a {genre} story for a {age}-year-old child.\n\n\
         Story Requirements:\n\
         - Length: {length}\n\
         - Genre: {genre_display}\n\
         - Language: Write the entire story in {language}\n\
         - Age-appropriate for {age} years old\n\n\
         User Input: \"{input}\"\n",
        genre = request.genre.display_name(),
        age = request.age_group,
        length = request.length.word_range(),
        genre_display = request.genre.display_name(),
        language = language_name,
        input = request.input_text(),
    );

    if !request.characters.is_empty() {
        prompt.push_str(&format!(
            "\n- Include these characters: {}",
            request.characters
        ));
    }

    if !request.setting.is_empty() {
        prompt.push_str(&format!("\n- Setting: {}", request.setting));
    }

    if !request.moral_lesson.is_empty() {
        prompt.push_str(&format!(
            "\n- Include this moral lesson: {}",
            request.moral_lesson
        ));
    }

    prompt.push_str(&format!(
        "\n\nPlease format your response as:\n\
         TITLE: [Story Title in {language}]\n\n\
         [Story content here in {language}...]\n\n\
         Make sure the story is:\n\
         - Written entirely in {language}\n\
         - Engaging and imaginative\n\
         - Age-appropriate with positive messages\n\
         - Educational and inspiring\n\
         - Safe for children (no violence, scary content, or inappropriate themes)\n\
         - Has a clear beginning, middle, and end\n\
         - Includes dialogue and descriptive language\n\
         - Uses simple vocabulary appropriate for the age group\n",
        language = language_name,
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Genre, Language, LengthTier};
    use chrono::Utc;
    use uuid::Uuid;

    fn request() -> StoryRequest {
        StoryRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            voice_input: "a story about a brave rabbit".to_string(),
            transcription: String::new(),
            genre: Genre::Adventure,
            length: LengthTier::Short,
            language: Language::Es,
            age_group: 7,
            characters: String::new(),
            setting: String::new(),
            moral_lesson: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn contains_age_language_and_length() {
        let prompt = build_story_prompt(&request());
        assert!(prompt.contains("7-year-old"));
        assert!(prompt.contains("Spanish"));
        assert!(prompt.contains("300-500 words"));
        assert!(prompt.contains("a story about a brave rabbit"));
    }

    #[test]
    fn optional_directives_omitted_when_empty() {
        let prompt = build_story_prompt(&request());
        assert!(!prompt.contains("Include these characters"));
        assert!(!prompt.contains("Setting:"));
        assert!(!prompt.contains("moral lesson"));
    }

    #[test]
    fn optional_directives_appended_when_present() {
        let mut req = request();
        req.characters = "a rabbit and a fox".to_string();
        req.setting = "an enchanted forest".to_string();
        req.moral_lesson = "courage".to_string();

        let prompt = build_story_prompt(&req);
        assert!(prompt.contains("Include these characters: a rabbit and a fox"));
        assert!(prompt.contains("Setting: an enchanted forest"));
        assert!(prompt.contains("Include this moral lesson: courage"));
    }

    #[test]
    fn auto_language_reads_as_english() {
        let mut req = request();
        req.language = Language::Auto;
        assert!(build_story_prompt(&req).contains("entirely in English"));
    }

    #[test]
    fn always_asks_for_title_marker() {
        assert!(build_story_prompt(&request()).contains("TITLE:"));
    }

    #[test]
    fn prefers_voice_input_over_transcription() {
        let mut req = request();
        req.transcription = "transcribed text".to_string();
        let prompt = build_story_prompt(&req);
        assert!(prompt.contains("a story about a brave rabbit"));
        assert!(!prompt.contains("transcribed text"));
    }
}
