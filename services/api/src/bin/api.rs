//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, GoogleTtsAdapter, OpenAiStoryAdapter},
    config::Config,
    error::ApiError,
    web::{
        create_story_handler, get_story_handler, list_stories_handler, rest::ApiDoc,
        state::AppState, stats_handler, synthesize_audio_handler, toggle_favorite_handler,
        voice_upload_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use vocal_tales_core::orchestrator::StoryOrchestrator;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Provider Adapters ---
    let openai_config = OpenAIConfig::new()
        .with_api_key(&config.generation_api_key)
        .with_api_base(&config.generation_api_base);
    let openai_client = Client::with_config(openai_config);

    let generator = Arc::new(OpenAiStoryAdapter::new(
        openai_client,
        config.generation_model.clone(),
    ));

    let synthesizer = Arc::new(
        GoogleTtsAdapter::new(config.tts_endpoint.clone())
            .map_err(|e| ApiError::Internal(e.to_string()))?,
    );

    // --- 4. Build the Shared AppState ---
    let orchestrator = Arc::new(StoryOrchestrator::new(store.clone(), generator));
    let app_state = Arc::new(AppState {
        store,
        config: config.clone(),
        orchestrator,
        synthesizer,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/api/stories/create/", post(create_story_handler))
        .route("/api/stories/", get(list_stories_handler))
        .route("/api/stories/{id}/", get(get_story_handler))
        .route("/api/stories/{id}/favorite/", post(toggle_favorite_handler))
        .route("/api/voice/upload/", post(voice_upload_handler))
        .route("/api/stats/", get(stats_handler))
        .route("/api/tts/gtts/", post(synthesize_audio_handler))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
