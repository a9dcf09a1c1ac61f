//! crates/style_discovery_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the discovery engine.
//! These traits form the boundary of the hexagonal architecture: the storage
//! collaborators sit behind the async ports, while time and randomness are
//! injected through the synchronous `Clock` and `Shuffler` ports so every
//! session transition can be replayed deterministically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Image, SessionResult, StudioSettings};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Stored document could not be decoded: {0}")]
    Serialization(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<serde_json::Error> for PortError {
    fn from(err: serde_json::Error) -> Self {
        PortError::Serialization(err.to_string())
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ImageLibrary: Send + Sync {
    /// Every image in the library, active or not, oldest first.
    async fn list_images(&self) -> PortResult<Vec<Image>>;

    async fn get_image(&self, id: &str) -> PortResult<Image>;

    /// Inserts or replaces the image stored under `image.id`.
    async fn save_image(&self, image: Image) -> PortResult<()>;

    async fn delete_image(&self, id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the stored settings, or the studio defaults when nothing was saved yet.
    async fn load_settings(&self) -> PortResult<StudioSettings>;

    async fn save_settings(&self, settings: &StudioSettings) -> PortResult<()>;
}

/// Append-only log of finished sessions.
#[async_trait]
pub trait SessionLog: Send + Sync {
    async fn append_session(&self, result: &SessionResult) -> PortResult<()>;

    async fn get_session(&self, id: Uuid) -> PortResult<SessionResult>;

    /// All recorded sessions in the order they were appended.
    async fn list_sessions(&self) -> PortResult<Vec<SessionResult>>;

    async fn delete_session(&self, id: Uuid) -> PortResult<()>;
}

//=========================================================================================
// Engine Ports (Traits)
//=========================================================================================

/// Source of the current instant, read once per session event.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of session-stack permutations.
pub trait Shuffler: Send {
    /// Returns a permutation of `0..len`.
    fn permutation(&mut self, len: usize) -> Vec<usize>;
}
