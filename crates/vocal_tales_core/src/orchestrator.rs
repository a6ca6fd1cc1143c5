//! crates/vocal_tales_core/src/orchestrator.rs
//!
//! Sequences one story generation: language detection, prompt
//! construction, a single provider call, response parsing, and the
//! persisted result, with a failed-record fallback.

use std::sync::Arc;

use crate::domain::{GeneratedStory, Language, StoryRequest, StoryStatus};
use crate::language::detect_language;
use crate::parse::parse_story_response;
use crate::ports::{PortResult, StoryGenerator, StoryStore};
use crate::prompt::build_story_prompt;

/// Title recorded on a story whose generation attempt failed.
pub const FAILED_TITLE: &str = "Story Generation Failed";

/// Drives a story request through detection, prompting, generation and
/// persistence.
///
/// A provider failure never escapes `generate`: it is downgraded to a
/// persisted story with status `failed` whose body embeds the failure
/// reason. Only the orchestrator's own persistence errors propagate.
pub struct StoryOrchestrator {
    store: Arc<dyn StoryStore>,
    generator: Arc<dyn StoryGenerator>,
}

impl StoryOrchestrator {
    pub fn new(store: Arc<dyn StoryStore>, generator: Arc<dyn StoryGenerator>) -> Self {
        Self { store, generator }
    }

    /// Generates and persists the story for `request`, returning the
    /// stored record. The caller always receives a `GeneratedStory`
    /// whose status is `completed` or `failed`; the transient
    /// `generating` state is never observable here.
    pub async fn generate(&self, request: &StoryRequest) -> PortResult<GeneratedStory> {
        let mut request = request.clone();

        // Back-fill the detected language before building the prompt.
        // The update is persisted so later readers of the request see it.
        if request.language == Language::Auto {
            let detected = detect_language(request.input_text());
            self.store
                .update_request_language(request.id, detected)
                .await?;
            request.language = detected;
        }

        let prompt = build_story_prompt(&request);

        // Exactly one provider call, no retries. The explicit match on
        // its result decides which record gets persisted.
        match self.generator.generate(&prompt).await {
            Ok(reply) => {
                let (title, body) = parse_story_response(&reply);
                self.store
                    .create_story(
                        request.id,
                        &title,
                        &body,
                        self.generator.model_id(),
                        StoryStatus::Completed,
                    )
                    .await
            }
            Err(reason) => {
                let body = format!(
                    "Sorry, we couldn't generate your story right now. \
                     Please try again! Error: {reason}"
                );
                self.store
                    .create_story(
                        request.id,
                        FAILED_TITLE,
                        &body,
                        self.generator.model_id(),
                        StoryStatus::Failed,
                    )
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{derive_reading_metrics, ChildProfile, Genre, LengthTier, StorySession};
    use crate::ports::{NewStoryRequest, PortError};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use uuid::Uuid;

    /// In-memory store mirroring the persistence contract.
    #[derive(Default)]
    struct MemoryStore {
        requests: Mutex<HashMap<Uuid, StoryRequest>>,
        stories: Mutex<HashMap<Uuid, GeneratedStory>>,
        favorites: Mutex<HashSet<(Uuid, Uuid)>>,
    }

    #[async_trait]
    impl StoryStore for MemoryStore {
        async fn get_or_create_user(&self, user_id: Uuid) -> PortResult<Uuid> {
            Ok(user_id)
        }

        async fn create_story_request(
            &self,
            user_id: Uuid,
            params: NewStoryRequest,
        ) -> PortResult<StoryRequest> {
            let request = StoryRequest {
                id: Uuid::new_v4(),
                user_id,
                voice_input: params.voice_input,
                transcription: params.transcription,
                genre: params.genre,
                length: params.length,
                language: params.language,
                age_group: params.age_group,
                characters: params.characters,
                setting: params.setting,
                moral_lesson: params.moral_lesson,
                created_at: Utc::now(),
            };
            self.requests
                .lock()
                .unwrap()
                .insert(request.id, request.clone());
            Ok(request)
        }

        async fn get_story_request(&self, request_id: Uuid) -> PortResult<StoryRequest> {
            self.requests
                .lock()
                .unwrap()
                .get(&request_id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(format!("Request {request_id}")))
        }

        async fn update_request_language(
            &self,
            request_id: Uuid,
            language: Language,
        ) -> PortResult<()> {
            let mut requests = self.requests.lock().unwrap();
            let request = requests
                .get_mut(&request_id)
                .ok_or_else(|| PortError::NotFound(format!("Request {request_id}")))?;
            request.language = language;
            Ok(())
        }

        async fn create_story(
            &self,
            request_id: Uuid,
            title: &str,
            content: &str,
            ai_model_used: &str,
            status: StoryStatus,
        ) -> PortResult<GeneratedStory> {
            let (word_count, estimated_duration) = derive_reading_metrics(content);
            let now = Utc::now();
            let story = GeneratedStory {
                id: Uuid::new_v4(),
                request_id,
                title: title.to_string(),
                content: content.to_string(),
                ai_model_used: ai_model_used.to_string(),
                status,
                word_count,
                estimated_duration,
                created_at: now,
                updated_at: now,
            };
            self.stories.lock().unwrap().insert(story.id, story.clone());
            Ok(story)
        }

        async fn get_story(&self, story_id: Uuid) -> PortResult<GeneratedStory> {
            self.stories
                .lock()
                .unwrap()
                .get(&story_id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(format!("Story {story_id}")))
        }

        async fn list_completed_stories(&self) -> PortResult<Vec<GeneratedStory>> {
            let mut stories: Vec<_> = self
                .stories
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.status == StoryStatus::Completed)
                .cloned()
                .collect();
            stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(stories)
        }

        async fn count_completed_stories(&self) -> PortResult<i64> {
            Ok(self.list_completed_stories().await?.len() as i64)
        }

        async fn count_story_requests(&self) -> PortResult<i64> {
            Ok(self.requests.lock().unwrap().len() as i64)
        }

        async fn toggle_favorite(&self, user_id: Uuid, story_id: Uuid) -> PortResult<bool> {
            let mut favorites = self.favorites.lock().unwrap();
            if favorites.remove(&(user_id, story_id)) {
                Ok(false)
            } else {
                favorites.insert((user_id, story_id));
                Ok(true)
            }
        }

        async fn upsert_child_profile(
            &self,
            user_id: Uuid,
            name: &str,
            age: i32,
            favorite_genres: &[Genre],
        ) -> PortResult<ChildProfile> {
            Ok(ChildProfile {
                id: Uuid::new_v4(),
                user_id,
                name: name.to_string(),
                age,
                favorite_genres: favorite_genres.to_vec(),
                created_at: Utc::now(),
            })
        }

        async fn get_child_profile(&self, user_id: Uuid) -> PortResult<ChildProfile> {
            Err(PortError::NotFound(format!("Profile for {user_id}")))
        }

        async fn start_story_session(
            &self,
            user_id: Uuid,
            story_id: Uuid,
        ) -> PortResult<StorySession> {
            Ok(StorySession {
                id: Uuid::new_v4(),
                user_id,
                story_id,
                started_at: Utc::now(),
                completed_at: None,
                duration_listened: 0,
                rating: None,
            })
        }

        async fn finish_story_session(
            &self,
            _session_id: Uuid,
            _duration_listened: i32,
            _rating: Option<i32>,
        ) -> PortResult<()> {
            Ok(())
        }
    }

    enum Reply {
        Succeed(&'static str),
        Fail(&'static str),
    }

    struct FakeGenerator {
        reply: Reply,
    }

    #[async_trait]
    impl StoryGenerator for FakeGenerator {
        async fn generate(&self, _prompt: &str) -> PortResult<String> {
            match &self.reply {
                Reply::Succeed(text) => Ok((*text).to_string()),
                Reply::Fail(reason) => Err(PortError::Provider((*reason).to_string())),
            }
        }

        fn model_id(&self) -> &str {
            "test-model"
        }
    }

    async fn seed_request(store: &MemoryStore, language: Language, voice: &str) -> StoryRequest {
        store
            .create_story_request(
                Uuid::new_v4(),
                NewStoryRequest {
                    voice_input: voice.to_string(),
                    genre: Genre::Adventure,
                    length: LengthTier::Short,
                    language,
                    age_group: 6,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn successful_generation_persists_completed_story() {
        let store = Arc::new(MemoryStore::default());
        let generator = Arc::new(FakeGenerator {
            reply: Reply::Succeed("TITLE: The Brave Rabbit\nOnce upon a time there was a rabbit."),
        });
        let orchestrator = StoryOrchestrator::new(store.clone(), generator);

        let request = seed_request(&store, Language::En, "a rabbit story").await;
        let story = orchestrator.generate(&request).await.unwrap();

        assert_eq!(story.status, StoryStatus::Completed);
        assert_eq!(story.title, "The Brave Rabbit");
        assert_eq!(story.content, "Once upon a time there was a rabbit.");
        assert_eq!(story.ai_model_used, "test-model");
        assert_eq!(story.word_count, 8);
        // Persisted, not just returned.
        assert_eq!(store.get_story(story.id).await.unwrap().title, story.title);
    }

    #[tokio::test]
    async fn provider_failure_yields_failed_record_not_error() {
        let store = Arc::new(MemoryStore::default());
        let generator = Arc::new(FakeGenerator {
            reply: Reply::Fail("connection refused"),
        });
        let orchestrator = StoryOrchestrator::new(store.clone(), generator);

        let request = seed_request(&store, Language::En, "any").await;
        let story = orchestrator.generate(&request).await.unwrap();

        assert_eq!(story.status, StoryStatus::Failed);
        assert_eq!(story.title, FAILED_TITLE);
        assert!(story.content.contains("connection refused"));
        assert!(!story.content.is_empty());
    }

    #[tokio::test]
    async fn auto_language_is_detected_and_persisted() {
        let store = Arc::new(MemoryStore::default());
        let generator = Arc::new(FakeGenerator {
            reply: Reply::Succeed("TITLE: Hola\nUn cuento."),
        });
        let orchestrator = StoryOrchestrator::new(store.clone(), generator);

        let request = seed_request(&store, Language::Auto, "Hola, ¿cómo estás?").await;
        orchestrator.generate(&request).await.unwrap();

        let stored = store.requests.lock().unwrap()[&request.id].clone();
        assert_eq!(stored.language, Language::Es);
    }

    #[tokio::test]
    async fn explicit_language_is_left_untouched() {
        let store = Arc::new(MemoryStore::default());
        let generator = Arc::new(FakeGenerator {
            reply: Reply::Succeed("TITLE: T\nB"),
        });
        let orchestrator = StoryOrchestrator::new(store.clone(), generator);

        let request = seed_request(&store, Language::Fr, "Hola, ¿cómo estás?").await;
        orchestrator.generate(&request).await.unwrap();

        let stored = store.requests.lock().unwrap()[&request.id].clone();
        assert_eq!(stored.language, Language::Fr);
    }

    #[tokio::test]
    async fn favorite_toggle_is_idempotent_per_pair() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        let story = Uuid::new_v4();

        assert!(store.toggle_favorite(user, story).await.unwrap());
        assert!(!store.toggle_favorite(user, story).await.unwrap());
        assert!(store.toggle_favorite(user, story).await.unwrap());
        assert_eq!(store.favorites.lock().unwrap().len(), 1);
    }
}
