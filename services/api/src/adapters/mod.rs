pub mod db;
pub mod story_llm;
pub mod tts;

pub use db::DbAdapter;
pub use story_llm::OpenAiStoryAdapter;
pub use tts::GoogleTtsAdapter;
