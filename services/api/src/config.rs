//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// API key for the OpenAI-compatible generation provider.
    pub generation_api_key: String,
    /// Base URL of the generation provider (Groq's OpenAI-compatible
    /// endpoint by default).
    pub generation_api_base: String,
    pub generation_model: String,
    /// Base URL of the speech-synthesis endpoint.
    pub tts_endpoint: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Provider Settings ---
        let generation_api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| ConfigError::MissingVar("GROQ_API_KEY".to_string()))?;

        let generation_api_base = std::env::var("GENERATION_API_BASE")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());

        let generation_model = std::env::var("GENERATION_MODEL")
            .unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());

        let tts_endpoint = std::env::var("TTS_ENDPOINT")
            .unwrap_or_else(|_| "https://translate.google.com/translate_tts".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            generation_api_key,
            generation_api_base,
            generation_model,
            tts_endpoint,
        })
    }
}
