//! services/api/src/adapters/tts.rs
//!
//! This module contains the adapter for the speech-synthesis provider.
//! It implements the `SpeechSynthesizer` port from the `core` crate
//! against the Google Translate TTS endpoint, which returns MPEG audio
//! for a text fragment in a given language.

use async_trait::async_trait;
use std::time::Duration;
use vocal_tales_core::domain::Language;
use vocal_tales_core::narration::synthesis_language_code;
use vocal_tales_core::ports::{PortError, PortResult, SpeechSynthesizer};

/// The endpoint rejects fragments much longer than this, so longer text
/// is synthesized in chunks and the MPEG frames concatenated.
const MAX_FRAGMENT_CHARS: usize = 200;

/// Defensive cap on one provider call; the spec mandates no timeout but
/// an unbounded hang would pin the request slot forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SpeechSynthesizer` port using the
/// Google Translate TTS endpoint.
#[derive(Clone)]
pub struct GoogleTtsAdapter {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTtsAdapter {
    /// Creates a new `GoogleTtsAdapter`. Fails only if the HTTP client
    /// cannot be constructed.
    pub fn new(endpoint: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

/// Splits `text` into whitespace-respecting fragments of at most
/// `max_chars` characters each. A single word longer than the limit is
/// emitted alone and left for the provider to truncate.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            fragments.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        fragments.push(current);
    }

    fragments
}

//=========================================================================================
// `SpeechSynthesizer` Trait Implementation
//=========================================================================================

#[async_trait]
impl SpeechSynthesizer for GoogleTtsAdapter {
    /// Synthesizes MPEG audio for `text`, one provider call per
    /// fragment. Provider failures are surfaced verbatim; there is no
    /// retry and no fallback voice.
    async fn synthesize(&self, text: &str, language: Language) -> PortResult<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(PortError::InvalidInput("No text provided".to_string()));
        }

        let lang_code = synthesis_language_code(language);
        let mut audio = Vec::new();

        for fragment in chunk_text(text, MAX_FRAGMENT_CHARS) {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", lang_code),
                    ("q", fragment.as_str()),
                ])
                .send()
                .await
                .map_err(|e| PortError::Provider(e.to_string()))?;

            if !response.status().is_success() {
                return Err(PortError::Provider(format!(
                    "Synthesis endpoint returned {}",
                    response.status()
                )));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| PortError::Provider(e.to_string()))?;
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_fragment() {
        assert_eq!(chunk_text("hello world", 200), vec!["hello world"]);
    }

    #[test]
    fn long_text_splits_on_word_boundaries() {
        let text = "aaa bbb ccc ddd";
        let fragments = chunk_text(text, 7);
        assert_eq!(fragments, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn oversized_word_is_emitted_alone() {
        let fragments = chunk_text("tiny superlongwordthatwontfit tiny", 10);
        assert_eq!(fragments, vec!["tiny", "superlongwordthatwontfit", "tiny"]);
    }

    #[test]
    fn whitespace_only_text_yields_no_fragments() {
        assert!(chunk_text("   \n\t ", 200).is_empty());
    }
}
