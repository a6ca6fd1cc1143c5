pub mod domain;
pub mod language;
pub mod narration;
pub mod orchestrator;
pub mod parse;
pub mod ports;
pub mod prompt;

pub use domain::{
    derive_reading_metrics, ChildProfile, FavoriteStory, GeneratedStory, Genre, Language,
    LengthTier, StoryRequest, StorySession, StoryStatus,
};
pub use language::detect_language;
pub use narration::synthesis_language_code;
pub use orchestrator::{StoryOrchestrator, FAILED_TITLE};
pub use parse::{parse_story_response, FALLBACK_TITLE};
pub use ports::{
    NewStoryRequest, PortError, PortResult, SpeechSynthesizer, StoryGenerator, StoryStore,
};
pub use prompt::build_story_prompt;
