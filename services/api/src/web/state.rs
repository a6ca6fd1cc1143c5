//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and caller identity handling.

use crate::config::Config;
use axum::http::HeaderMap;
use std::sync::Arc;
use uuid::Uuid;
use vocal_tales_core::orchestrator::StoryOrchestrator;
use vocal_tales_core::ports::{SpeechSynthesizer, StoryStore};

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StoryStore>,
    pub config: Arc<Config>,
    pub orchestrator: Arc<StoryOrchestrator>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

//=========================================================================================
// Caller Identity
//=========================================================================================

/// Resolves the caller identity from the optional `x-user-id` header.
///
/// There is no authentication; identity is an explicit per-request
/// parameter so real multi-tenancy can slot in later. A missing or
/// malformed header falls back to the shared anonymous demo identity
/// (the nil UUID), matching the original single-demo-user behavior.
pub fn caller_id(headers: &HeaderMap) -> Uuid {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::nil)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_falls_back_to_demo_identity() {
        assert_eq!(caller_id(&HeaderMap::new()), Uuid::nil());
    }

    #[test]
    fn malformed_header_falls_back_to_demo_identity() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("not-a-uuid"));
        assert_eq!(caller_id(&headers), Uuid::nil());
    }

    #[test]
    fn valid_header_is_used() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(caller_id(&headers), id);
    }
}
