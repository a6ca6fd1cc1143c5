//! services/api/src/adapters/story_llm.rs
//!
//! This module contains the adapter for the story-generating LLM.
//! It implements the `StoryGenerator` port from the `core` crate against
//! any OpenAI-compatible chat-completion endpoint (Groq by default).

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    error::OpenAIError,
    Client,
};
use async_trait::async_trait;
use vocal_tales_core::ports::{PortError, PortResult, StoryGenerator};

const SYSTEM_INSTRUCTIONS: &str = "You are a creative children's storyteller. Create engaging, \
    age-appropriate stories with positive messages and educational value. Always include a \
    clear title and well-structured narrative.";

/// Fixed sampling temperature for story generation.
const TEMPERATURE: f32 = 0.8;

/// Fixed cap on the provider's output size.
const MAX_TOKENS: u32 = 2000;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StoryGenerator` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiStoryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiStoryAdapter {
    /// Creates a new `OpenAiStoryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `StoryGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoryGenerator for OpenAiStoryAdapter {
    /// Sends the prompt to the provider once and returns the raw
    /// assistant text. Any failure, including an empty reply, is
    /// reported as a provider error; retries are the caller's decision
    /// and none are made here.
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Provider(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| PortError::Provider("Provider returned an empty reply".to_string()))?;

        Ok(content)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
