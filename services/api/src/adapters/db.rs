//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `StoryStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Queries are bound at runtime rather than checked by the compile-time
//! macros, so the crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use vocal_tales_core::domain::{
    derive_reading_metrics, ChildProfile, Genre, GeneratedStory, Language, LengthTier,
    StoryRequest, StorySession, StoryStatus,
};
use vocal_tales_core::ports::{NewStoryRequest, PortError, PortResult, StoryStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StoryStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct StoryRequestRecord {
    id: Uuid,
    user_id: Uuid,
    voice_input: String,
    transcription: String,
    genre: String,
    length: String,
    language: String,
    age_group: i32,
    characters: String,
    setting: String,
    moral_lesson: String,
    created_at: DateTime<Utc>,
}

impl StoryRequestRecord {
    fn to_domain(self) -> StoryRequest {
        StoryRequest {
            id: self.id,
            user_id: self.user_id,
            voice_input: self.voice_input,
            transcription: self.transcription,
            genre: Genre::from_code(&self.genre),
            length: LengthTier::from_code(&self.length),
            language: Language::from_code(&self.language),
            age_group: self.age_group,
            characters: self.characters,
            setting: self.setting,
            moral_lesson: self.moral_lesson,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct GeneratedStoryRecord {
    id: Uuid,
    request_id: Uuid,
    title: String,
    content: String,
    ai_model_used: String,
    status: String,
    word_count: i32,
    estimated_duration: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GeneratedStoryRecord {
    fn to_domain(self) -> GeneratedStory {
        GeneratedStory {
            id: self.id,
            request_id: self.request_id,
            title: self.title,
            content: self.content,
            ai_model_used: self.ai_model_used,
            status: StoryStatus::from_code(&self.status),
            word_count: self.word_count,
            estimated_duration: self.estimated_duration,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ChildProfileRecord {
    id: Uuid,
    user_id: Uuid,
    name: String,
    age: i32,
    favorite_genres: String,
    created_at: DateTime<Utc>,
}

impl ChildProfileRecord {
    fn to_domain(self) -> ChildProfile {
        let favorite_genres: Vec<Genre> =
            serde_json::from_str(&self.favorite_genres).unwrap_or_default();
        ChildProfile {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            age: self.age,
            favorite_genres,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct StorySessionRecord {
    id: Uuid,
    user_id: Uuid,
    story_id: Uuid,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    duration_listened: i32,
    rating: Option<i32>,
}

impl StorySessionRecord {
    fn to_domain(self) -> StorySession {
        StorySession {
            id: self.id,
            user_id: self.user_id,
            story_id: self.story_id,
            started_at: self.started_at,
            completed_at: self.completed_at,
            duration_listened: self.duration_listened,
            rating: self.rating,
        }
    }
}

const STORY_COLUMNS: &str = "id, request_id, title, content, ai_model_used, status, \
                             word_count, estimated_duration, created_at, updated_at";

const REQUEST_COLUMNS: &str = "id, user_id, voice_input, transcription, genre, length, \
                               language, age_group, characters, setting, moral_lesson, \
                               created_at";

//=========================================================================================
// `StoryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoryStore for DbAdapter {
    async fn get_or_create_user(&self, user_id: Uuid) -> PortResult<Uuid> {
        sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(user_id)
    }

    async fn create_story_request(
        &self,
        user_id: Uuid,
        params: NewStoryRequest,
    ) -> PortResult<StoryRequest> {
        let sql = format!(
            "INSERT INTO story_requests \
             (id, user_id, voice_input, transcription, genre, length, language, age_group, \
              characters, setting, moral_lesson) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {REQUEST_COLUMNS}"
        );
        let record = sqlx::query_as::<_, StoryRequestRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&params.voice_input)
            .bind(&params.transcription)
            .bind(params.genre.code())
            .bind(params.length.code())
            .bind(params.language.code())
            .bind(params.age_group)
            .bind(&params.characters)
            .bind(&params.setting)
            .bind(&params.moral_lesson)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_story_request(&self, request_id: Uuid) -> PortResult<StoryRequest> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM story_requests WHERE id = $1");
        let record = sqlx::query_as::<_, StoryRequestRecord>(&sql)
            .bind(request_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Story request {} not found", request_id))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn update_request_language(
        &self,
        request_id: Uuid,
        language: Language,
    ) -> PortResult<()> {
        sqlx::query("UPDATE story_requests SET language = $1 WHERE id = $2")
            .bind(language.code())
            .bind(request_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
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
        // Derived fields are recomputed at every write of the body.
        let (word_count, estimated_duration) = derive_reading_metrics(content);
        let sql = format!(
            "INSERT INTO generated_stories \
             (id, request_id, title, content, ai_model_used, status, word_count, \
              estimated_duration) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {STORY_COLUMNS}"
        );
        let record = sqlx::query_as::<_, GeneratedStoryRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(request_id)
            .bind(title)
            .bind(content)
            .bind(ai_model_used)
            .bind(status.code())
            .bind(word_count)
            .bind(estimated_duration)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_story(&self, story_id: Uuid) -> PortResult<GeneratedStory> {
        let sql = format!("SELECT {STORY_COLUMNS} FROM generated_stories WHERE id = $1");
        let record = sqlx::query_as::<_, GeneratedStoryRecord>(&sql)
            .bind(story_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Story {} not found", story_id))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn list_completed_stories(&self) -> PortResult<Vec<GeneratedStory>> {
        let sql = format!(
            "SELECT {STORY_COLUMNS} FROM generated_stories \
             WHERE status = 'completed' ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, GeneratedStoryRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn count_completed_stories(&self) -> PortResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM generated_stories WHERE status = 'completed'")
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(count)
    }

    async fn count_story_requests(&self) -> PortResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM story_requests")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(count)
    }

    async fn toggle_favorite(&self, user_id: Uuid, story_id: Uuid) -> PortResult<bool> {
        // Insert-or-ignore first; zero rows affected means the pair
        // already existed and the toggle becomes a delete. The unique
        // (user_id, story_id) constraint keeps concurrent toggles from
        // the same caller consistent.
        let inserted = sqlx::query(
            "INSERT INTO favorite_stories (id, user_id, story_id) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, story_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(story_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?
        .rows_affected();

        if inserted == 1 {
            return Ok(true);
        }

        sqlx::query("DELETE FROM favorite_stories WHERE user_id = $1 AND story_id = $2")
            .bind(user_id)
            .bind(story_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(false)
    }

    async fn upsert_child_profile(
        &self,
        user_id: Uuid,
        name: &str,
        age: i32,
        favorite_genres: &[Genre],
    ) -> PortResult<ChildProfile> {
        let genres_json = serde_json::to_string(favorite_genres)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let record = sqlx::query_as::<_, ChildProfileRecord>(
            "INSERT INTO child_profiles (id, user_id, name, age, favorite_genres) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE \
             SET name = EXCLUDED.name, age = EXCLUDED.age, \
                 favorite_genres = EXCLUDED.favorite_genres \
             RETURNING id, user_id, name, age, favorite_genres, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(name)
        .bind(age)
        .bind(&genres_json)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_child_profile(&self, user_id: Uuid) -> PortResult<ChildProfile> {
        let record = sqlx::query_as::<_, ChildProfileRecord>(
            "SELECT id, user_id, name, age, favorite_genres, created_at \
             FROM child_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Profile for user {} not found", user_id))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn start_story_session(
        &self,
        user_id: Uuid,
        story_id: Uuid,
    ) -> PortResult<StorySession> {
        let record = sqlx::query_as::<_, StorySessionRecord>(
            "INSERT INTO story_sessions (id, user_id, story_id) VALUES ($1, $2, $3) \
             RETURNING id, user_id, story_id, started_at, completed_at, duration_listened, \
                       rating",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(story_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn finish_story_session(
        &self,
        session_id: Uuid,
        duration_listened: i32,
        rating: Option<i32>,
    ) -> PortResult<()> {
        if let Some(rating) = rating {
            if !(1..=5).contains(&rating) {
                return Err(PortError::InvalidInput(format!(
                    "Rating must be between 1 and 5, got {}",
                    rating
                )));
            }
        }
        sqlx::query(
            "UPDATE story_sessions \
             SET completed_at = now(), duration_listened = $1, rating = $2 \
             WHERE id = $3",
        )
        .bind(duration_listened)
        .bind(rating)
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }
}
