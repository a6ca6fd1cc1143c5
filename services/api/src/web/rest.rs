//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::{caller_id, AppState};
use axum::{
    extract::{Multipart, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;
use vocal_tales_core::domain::{GeneratedStory, Genre, Language, LengthTier, StoryRequest};
use vocal_tales_core::ports::{NewStoryRequest, PortError};

/// Fixed reply of the voice-upload endpoint: transcription happens in
/// the caller's browser, never on the server.
const TRANSCRIPTION_NOTICE: &str = "Voice recognition is handled by your browser. Please use \
    the microphone button on the webpage for real-time speech recognition.";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_story_handler,
        list_stories_handler,
        get_story_handler,
        toggle_favorite_handler,
        voice_upload_handler,
        stats_handler,
        synthesize_audio_handler,
    ),
    components(
        schemas(
            CreateStoryPayload,
            CreateStoryResponse,
            GeneratedStoryRepr,
            StoryRequestRepr,
            FavoriteResponse,
            VoiceUploadResponse,
            StatsResponse,
            TtsPayload,
        )
    ),
    tags(
        (name = "VocalTales API", description = "API endpoints for voice-driven children's story generation.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The request payload for creating a story.
#[derive(Deserialize, ToSchema)]
pub struct CreateStoryPayload {
    #[serde(default)]
    pub voice_input: String,
    #[serde(default)]
    pub transcription: String,
    /// Genre code; unknown values fall back to `adventure`.
    #[serde(default)]
    pub genre: Option<String>,
    /// Length tier code; unknown values fall back to `medium`.
    #[serde(default)]
    pub length: Option<String>,
    /// Language code, or `auto` (the default) to detect from the input.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_age_group")]
    pub age_group: i32,
    #[serde(default)]
    pub characters: String,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub moral_lesson: String,
}

fn default_age_group() -> i32 {
    6
}

/// Wire representation of a story request.
#[derive(Serialize, ToSchema)]
pub struct StoryRequestRepr {
    pub id: Uuid,
    pub voice_input: String,
    pub transcription: String,
    pub genre: String,
    pub genre_display: String,
    pub length: String,
    pub length_display: String,
    pub language: String,
    pub age_group: i32,
    pub characters: String,
    pub setting: String,
    pub moral_lesson: String,
    pub created_at: DateTime<Utc>,
}

impl StoryRequestRepr {
    fn from_domain(request: StoryRequest) -> Self {
        Self {
            id: request.id,
            voice_input: request.voice_input,
            transcription: request.transcription,
            genre: request.genre.code().to_string(),
            genre_display: request.genre.display_name().to_string(),
            length: request.length.code().to_string(),
            length_display: request.length.display_name().to_string(),
            language: request.language.code().to_string(),
            age_group: request.age_group,
            characters: request.characters,
            setting: request.setting,
            moral_lesson: request.moral_lesson,
            created_at: request.created_at,
        }
    }
}

/// Wire representation of a generated story, with its owning request
/// embedded when available.
#[derive(Serialize, ToSchema)]
pub struct GeneratedStoryRepr {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub ai_model_used: String,
    pub status: String,
    pub status_display: String,
    pub word_count: i32,
    pub estimated_duration: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub request: Option<StoryRequestRepr>,
}

impl GeneratedStoryRepr {
    fn from_domain(story: GeneratedStory, request: Option<StoryRequest>) -> Self {
        Self {
            id: story.id,
            title: story.title,
            content: story.content,
            ai_model_used: story.ai_model_used,
            status: story.status.code().to_string(),
            status_display: story.status.display_name().to_string(),
            word_count: story.word_count,
            estimated_duration: story.estimated_duration,
            created_at: story.created_at,
            updated_at: story.updated_at,
            request: request.map(StoryRequestRepr::from_domain),
        }
    }
}

/// The response payload sent after a story creation attempt.
#[derive(Serialize, ToSchema)]
pub struct CreateStoryResponse {
    pub success: bool,
    pub story: GeneratedStoryRepr,
    pub message: String,
}

/// The response payload of the favorite toggle.
#[derive(Serialize, ToSchema)]
pub struct FavoriteResponse {
    pub success: bool,
    pub message: String,
    pub is_favorite: bool,
}

/// The response payload of the voice upload endpoint.
#[derive(Serialize, ToSchema)]
pub struct VoiceUploadResponse {
    pub success: bool,
    pub transcription: String,
    pub message: String,
}

/// Aggregate statistics about stories and requests.
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_stories: i64,
    pub total_requests: i64,
    pub success_rate: f64,
}

/// The request payload for speech synthesis.
#[derive(Deserialize, ToSchema)]
pub struct TtsPayload {
    #[serde(default)]
    pub text: String,
    /// Language code; unmapped values fall back to English.
    #[serde(default)]
    pub language: Option<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new story from voice input or text.
#[utoipa::path(
    post,
    path = "/api/stories/create/",
    request_body = CreateStoryPayload,
    responses(
        (status = 201, description = "Story generated (status may still be 'failed')", body = CreateStoryResponse),
        (status = 500, description = "Unhandled failure during creation")
    )
)]
pub async fn create_story_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateStoryPayload>,
) -> Response {
    let user_id = caller_id(&headers);

    let params = NewStoryRequest {
        voice_input: payload.voice_input,
        transcription: payload.transcription,
        genre: Genre::from_code(payload.genre.as_deref().unwrap_or_default()),
        length: LengthTier::from_code(payload.length.as_deref().unwrap_or_default()),
        language: payload
            .language
            .as_deref()
            .map(Language::from_code)
            .unwrap_or(Language::Auto),
        age_group: payload.age_group,
        characters: payload.characters,
        setting: payload.setting,
        moral_lesson: payload.moral_lesson,
    };

    let store = &app_state.store;
    let result = async {
        store.get_or_create_user(user_id).await?;
        let request = store.create_story_request(user_id, params).await?;
        let story = app_state.orchestrator.generate(&request).await?;
        // Re-read the request so a back-filled detected language shows up.
        let request = store.get_story_request(story.request_id).await.ok();
        Ok::<_, PortError>(GeneratedStoryRepr::from_domain(story, request))
    }
    .await;

    match result {
        Ok(story) => {
            info!(story_id = %story.id, status = %story.status, "Story created");
            (
                StatusCode::CREATED,
                Json(CreateStoryResponse {
                    success: true,
                    story,
                    message: "Story generated successfully!".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to create story: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                // The error's string form is exposed on purpose; see the
                // hardening notes before tightening this.
                Json(json!({
                    "success": false,
                    "error": e.to_string(),
                    "message": "Failed to generate story",
                })),
            )
                .into_response()
        }
    }
}

/// List all completed stories, newest first.
#[utoipa::path(
    get,
    path = "/api/stories/",
    responses(
        (status = 200, description = "Completed stories, newest first", body = [GeneratedStoryRepr]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_stories_handler(State(app_state): State<Arc<AppState>>) -> Response {
    let store = &app_state.store;
    let result = async {
        let stories = store.list_completed_stories().await?;
        let mut reprs = Vec::with_capacity(stories.len());
        for story in stories {
            let request = store.get_story_request(story.request_id).await.ok();
            reprs.push(GeneratedStoryRepr::from_domain(story, request));
        }
        Ok::<_, PortError>(reprs)
    }
    .await;

    match result {
        Ok(stories) => Json(stories).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Get a specific story by identifier.
#[utoipa::path(
    get,
    path = "/api/stories/{id}/",
    params(("id" = Uuid, Path, description = "The story identifier.")),
    responses(
        (status = 200, description = "The story", body = GeneratedStoryRepr),
        (status = 404, description = "Story not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_story_handler(
    State(app_state): State<Arc<AppState>>,
    Path(story_id): Path<Uuid>,
) -> Response {
    match app_state.store.get_story(story_id).await {
        Ok(story) => {
            let request = app_state.store.get_story_request(story.request_id).await.ok();
            Json(GeneratedStoryRepr::from_domain(story, request)).into_response()
        }
        Err(PortError::NotFound(_)) => story_not_found(),
        Err(e) => internal_error(e),
    }
}

/// Toggle a story's favorite state for the caller.
#[utoipa::path(
    post,
    path = "/api/stories/{id}/favorite/",
    params(("id" = Uuid, Path, description = "The story identifier.")),
    responses(
        (status = 200, description = "Favorite state toggled", body = FavoriteResponse),
        (status = 404, description = "Story not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn toggle_favorite_handler(
    State(app_state): State<Arc<AppState>>,
    Path(story_id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let user_id = caller_id(&headers);
    let store = &app_state.store;

    let result = async {
        store.get_or_create_user(user_id).await?;
        store.get_story(story_id).await?;
        store.toggle_favorite(user_id, story_id).await
    }
    .await;

    match result {
        Ok(is_favorite) => {
            let message = if is_favorite {
                "Story added to favorites"
            } else {
                "Story removed from favorites"
            };
            Json(FavoriteResponse {
                success: true,
                message: message.to_string(),
                is_favorite,
            })
            .into_response()
        }
        Err(PortError::NotFound(_)) => story_not_found(),
        Err(e) => internal_error(e),
    }
}

/// Accept a voice recording upload.
///
/// No server-side transcription is performed; the response directs the
/// caller to the browser's own speech recognition.
#[utoipa::path(
    post,
    path = "/api/voice/upload/",
    request_body(content_type = "multipart/form-data", description = "The audio recording."),
    responses(
        (status = 200, description = "Upload acknowledged", body = VoiceUploadResponse),
        (status = 400, description = "No audio file provided")
    )
)]
pub async fn voice_upload_handler(mut multipart: Multipart) -> Response {
    match multipart.next_field().await {
        Ok(Some(field)) => {
            let name = field.file_name().unwrap_or("recording").to_string();
            match field.bytes().await {
                Ok(data) => {
                    info!(file = %name, bytes = data.len(), "Voice upload received");
                    Json(VoiceUploadResponse {
                        success: true,
                        transcription: TRANSCRIPTION_NOTICE.to_string(),
                        message: "Audio transcribed successfully".to_string(),
                    })
                    .into_response()
                }
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": e.to_string(),
                        "message": "Failed to process audio",
                    })),
                )
                    .into_response(),
            }
        }
        Ok(None) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "No audio file provided",
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": e.to_string(),
            })),
        )
            .into_response(),
    }
}

/// Get basic statistics about stories.
#[utoipa::path(
    get,
    path = "/api/stats/",
    responses(
        (status = 200, description = "Story statistics", body = StatsResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn stats_handler(State(app_state): State<Arc<AppState>>) -> Response {
    let store = &app_state.store;
    let result = async {
        let total_stories = store.count_completed_stories().await?;
        let total_requests = store.count_story_requests().await?;
        Ok::<_, PortError>((total_stories, total_requests))
    }
    .await;

    match result {
        Ok((total_stories, total_requests)) => Json(StatsResponse {
            total_stories,
            total_requests,
            success_rate: success_rate(total_stories, total_requests),
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

/// Synthesize spoken audio for a piece of text.
#[utoipa::path(
    post,
    path = "/api/tts/gtts/",
    request_body = TtsPayload,
    responses(
        (status = 200, description = "MPEG audio bytes", body = Vec<u8>, content_type = "audio/mpeg"),
        (status = 400, description = "No text provided"),
        (status = 500, description = "Synthesis failed")
    )
)]
pub async fn synthesize_audio_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<TtsPayload>,
) -> Response {
    let language = Language::from_code(payload.language.as_deref().unwrap_or("en"));

    match app_state.synthesizer.synthesize(&payload.text, language).await {
        Ok(audio) => (
            [
                (CONTENT_TYPE, "audio/mpeg"),
                (CONTENT_DISPOSITION, "inline; filename=\"story_audio.mp3\""),
            ],
            audio,
        )
            .into_response(),
        Err(PortError::InvalidInput(e)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))).into_response()
        }
        Err(e) => {
            warn!("Speech synthesis failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

//=========================================================================================
// Shared Error Responses
//=========================================================================================

/// Completed/requested ratio as a percentage, rounded to 2 decimals.
/// Zero requests yields 0 rather than a division by zero.
fn success_rate(total_stories: i64, total_requests: i64) -> f64 {
    if total_requests == 0 {
        return 0.0;
    }
    let rate = total_stories as f64 / total_requests as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

fn story_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Story not found",
        })),
    )
        .into_response()
}

fn internal_error(e: PortError) -> Response {
    error!("Request failed: {:?}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_with_no_requests_is_zero() {
        assert_eq!(success_rate(0, 0), 0.0);
    }

    #[test]
    fn success_rate_rounds_to_two_decimals() {
        assert_eq!(success_rate(1, 3), 33.33);
        assert_eq!(success_rate(2, 3), 66.67);
        assert_eq!(success_rate(5, 5), 100.0);
    }
}
