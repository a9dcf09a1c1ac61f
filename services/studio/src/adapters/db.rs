//! services/studio/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the storage ports from the `core` crate. Every entity is stored as a JSON
//! document keyed by its id, in PostgreSQL via `sqlx`.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use style_discovery_core::domain::{Image, SessionResult, StudioSettings};
use style_discovery_core::ports::{
    ImageLibrary, PortError, PortResult, SessionLog, SettingsStore,
};
use uuid::Uuid;

/// The single row the studio settings live under.
const SETTINGS_KEY: &str = "studio";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
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

fn not_found_or_unexpected(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ImageRecord {
    id: String,
    document: String,
}
impl ImageRecord {
    fn to_domain(self) -> PortResult<Image> {
        serde_json::from_str(&self.document)
            .map_err(|e| PortError::Serialization(format!("image {}: {}", self.id, e)))
    }
}

#[derive(FromRow)]
struct SettingsRecord {
    document: String,
}
impl SettingsRecord {
    fn to_domain(self) -> PortResult<StudioSettings> {
        Ok(serde_json::from_str(&self.document)?)
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    document: String,
}
impl SessionRecord {
    fn to_domain(self) -> PortResult<SessionResult> {
        serde_json::from_str(&self.document)
            .map_err(|e| PortError::Serialization(format!("session {}: {}", self.id, e)))
    }
}

//=========================================================================================
// `ImageLibrary` Trait Implementation
//=========================================================================================

#[async_trait]
impl ImageLibrary for PgStore {
    async fn list_images(&self) -> PortResult<Vec<Image>> {
        let records = sqlx::query_as::<_, ImageRecord>(
            "SELECT id, document FROM images ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_image(&self, id: &str) -> PortResult<Image> {
        let record = sqlx::query_as::<_, ImageRecord>(
            "SELECT id, document FROM images WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("Image {} not found", id)))?;
        record.to_domain()
    }

    async fn save_image(&self, image: Image) -> PortResult<()> {
        let document = serde_json::to_string(&image)?;
        sqlx::query(
            "INSERT INTO images (id, created_at, document) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET created_at = EXCLUDED.created_at, document = EXCLUDED.document",
        )
        .bind(&image.id)
        .bind(image.created_at)
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_image(&self, id: &str) -> PortResult<()> {
        let outcome = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if outcome.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Image {} not found", id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `SettingsStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SettingsStore for PgStore {
    async fn load_settings(&self) -> PortResult<StudioSettings> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            "SELECT document FROM studio_settings WHERE key = $1",
        )
        .bind(SETTINGS_KEY)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match record {
            Some(record) => record.to_domain(),
            None => Ok(StudioSettings::default()),
        }
    }

    async fn save_settings(&self, settings: &StudioSettings) -> PortResult<()> {
        let document = serde_json::to_string(settings)?;
        sqlx::query(
            "INSERT INTO studio_settings (key, document) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET document = EXCLUDED.document, updated_at = now()",
        )
        .bind(SETTINGS_KEY)
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `SessionLog` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionLog for PgStore {
    async fn append_session(&self, result: &SessionResult) -> PortResult<()> {
        let document = serde_json::to_string(result)?;
        sqlx::query("INSERT INTO session_results (id, recorded_at, document) VALUES ($1, $2, $3)")
            .bind(result.id)
            .bind(result.date)
            .bind(document)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> PortResult<SessionResult> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, document FROM session_results WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("Session {} not found", id)))?;
        record.to_domain()
    }

    async fn list_sessions(&self) -> PortResult<Vec<SessionResult>> {
        let records = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, document FROM session_results ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn delete_session(&self, id: Uuid) -> PortResult<()> {
        let outcome = sqlx::query("DELETE FROM session_results WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if outcome.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Session {} not found", id)));
        }
        Ok(())
    }
}
