//! services/studio/src/adapters/memory.rs
//!
//! An in-memory implementation of the storage ports. Used when no database is
//! configured and by the integration tests. Nothing survives a restart.

use async_trait::async_trait;
use style_discovery_core::domain::{Image, SessionResult, StudioSettings};
use style_discovery_core::ports::{
    ImageLibrary, PortError, PortResult, SessionLog, SettingsStore,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    // Insertion order doubles as library order.
    images: RwLock<Vec<Image>>,
    settings: RwLock<Option<StudioSettings>>,
    sessions: RwLock<Vec<SessionResult>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `images` and `settings`.
    pub fn seeded(images: Vec<Image>, settings: StudioSettings) -> Self {
        Self {
            images: RwLock::new(images),
            settings: RwLock::new(Some(settings)),
            sessions: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageLibrary for InMemoryStore {
    async fn list_images(&self) -> PortResult<Vec<Image>> {
        Ok(self.images.read().await.clone())
    }

    async fn get_image(&self, id: &str) -> PortResult<Image> {
        self.images
            .read()
            .await
            .iter()
            .find(|img| img.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Image {} not found", id)))
    }

    async fn save_image(&self, image: Image) -> PortResult<()> {
        let mut images = self.images.write().await;
        match images.iter_mut().find(|img| img.id == image.id) {
            Some(existing) => *existing = image,
            None => images.push(image),
        }
        Ok(())
    }

    async fn delete_image(&self, id: &str) -> PortResult<()> {
        let mut images = self.images.write().await;
        let before = images.len();
        images.retain(|img| img.id != id);
        if images.len() == before {
            return Err(PortError::NotFound(format!("Image {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn load_settings(&self) -> PortResult<StudioSettings> {
        Ok(self.settings.read().await.clone().unwrap_or_default())
    }

    async fn save_settings(&self, settings: &StudioSettings) -> PortResult<()> {
        *self.settings.write().await = Some(settings.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionLog for InMemoryStore {
    async fn append_session(&self, result: &SessionResult) -> PortResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.iter().any(|s| s.id == result.id) {
            return Err(PortError::Unexpected(format!(
                "Session {} already recorded",
                result.id
            )));
        }
        sessions.push(result.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> PortResult<SessionResult> {
        self.sessions
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Session {} not found", id)))
    }

    async fn list_sessions(&self) -> PortResult<Vec<SessionResult>> {
        Ok(self.sessions.read().await.clone())
    }

    async fn delete_session(&self, id: Uuid) -> PortResult<()> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return Err(PortError::NotFound(format!("Session {} not found", id)));
        }
        Ok(())
    }
}
