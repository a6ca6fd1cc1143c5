pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible to the binary
// that builds the web server router.
pub use rest::{
    create_story_handler, get_story_handler, list_stories_handler, stats_handler,
    synthesize_audio_handler, toggle_favorite_handler, voice_upload_handler,
};
