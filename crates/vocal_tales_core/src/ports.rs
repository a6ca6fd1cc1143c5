//! crates/vocal_tales_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or
//! provider APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    ChildProfile, Genre, GeneratedStory, Language, LengthTier, StoryRequest, StorySession,
    StoryStatus,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Provider call failed: {0}")]
    Provider(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Parameters for creating a new story request record.
#[derive(Debug, Clone, Default)]
pub struct NewStoryRequest {
    pub voice_input: String,
    pub transcription: String,
    pub genre: Genre,
    pub length: LengthTier,
    pub language: Language,
    pub age_group: i32,
    pub characters: String,
    pub setting: String,
    pub moral_lesson: String,
}

/// Persistence port for every record the application owns.
///
/// Each method is one independent write or read; no multi-record
/// transaction spans the orchestration.
#[async_trait]
pub trait StoryStore: Send + Sync {
    // --- User Management ---
    async fn get_or_create_user(&self, user_id: Uuid) -> PortResult<Uuid>;

    // --- Story Requests ---
    async fn create_story_request(
        &self,
        user_id: Uuid,
        params: NewStoryRequest,
    ) -> PortResult<StoryRequest>;

    async fn get_story_request(&self, request_id: Uuid) -> PortResult<StoryRequest>;

    /// Back-fills a detected language onto an `auto` request. Observable
    /// to later readers of the request record.
    async fn update_request_language(
        &self,
        request_id: Uuid,
        language: Language,
    ) -> PortResult<()>;

    // --- Generated Stories ---
    async fn create_story(
        &self,
        request_id: Uuid,
        title: &str,
        content: &str,
        ai_model_used: &str,
        status: StoryStatus,
    ) -> PortResult<GeneratedStory>;

    async fn get_story(&self, story_id: Uuid) -> PortResult<GeneratedStory>;

    /// Completed stories, newest first.
    async fn list_completed_stories(&self) -> PortResult<Vec<GeneratedStory>>;

    async fn count_completed_stories(&self) -> PortResult<i64>;

    async fn count_story_requests(&self) -> PortResult<i64>;

    /// Atomic get-or-create-or-delete favorite toggle for one
    /// (owner, story) pair. Returns true when the story is now a favorite.
    async fn toggle_favorite(&self, user_id: Uuid, story_id: Uuid) -> PortResult<bool>;

    // --- Child Profiles ---
    async fn upsert_child_profile(
        &self,
        user_id: Uuid,
        name: &str,
        age: i32,
        favorite_genres: &[Genre],
    ) -> PortResult<ChildProfile>;

    async fn get_child_profile(&self, user_id: Uuid) -> PortResult<ChildProfile>;

    // --- Listening Sessions ---
    async fn start_story_session(&self, user_id: Uuid, story_id: Uuid)
        -> PortResult<StorySession>;

    async fn finish_story_session(
        &self,
        session_id: Uuid,
        duration_listened: i32,
        rating: Option<i32>,
    ) -> PortResult<()>;
}

/// The external language-generation provider, chat-completion style.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Sends one prompt to the provider and returns the raw assistant text.
    /// No retries; any failure is returned to the caller.
    async fn generate(&self, prompt: &str) -> PortResult<String>;

    /// Identifier of the generation model, recorded on every story.
    fn model_id(&self) -> &str;
}

/// The external speech-synthesis provider.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes MPEG audio for the given text in the given language.
    /// Empty text is a caller error, signaled as `PortError::InvalidInput`
    /// before any provider call is made.
    async fn synthesize(&self, text: &str, language: Language) -> PortResult<Vec<u8>>;
}
