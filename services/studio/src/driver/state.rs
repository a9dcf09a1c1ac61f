//! services/studio/src/driver/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::{InMemoryStore, PgStore};
use crate::config::Config;
use crate::error::StudioResult;
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::sync::Arc;
use style_discovery_core::clock::SystemClock;
use style_discovery_core::domain::Image;
use style_discovery_core::ports::{Clock, ImageLibrary, SessionLog, SettingsStore, Shuffler};
use style_discovery_core::shuffle::{RandomShuffler, SeededShuffler};
use tracing::{info, warn};

//=========================================================================================
// AppState (Shared Across All Sessions)
//=========================================================================================

/// The shared application state, created once at startup and passed to every session.
#[derive(Clone)]
pub struct AppState {
    pub images: Arc<dyn ImageLibrary>,
    pub settings: Arc<dyn SettingsStore>,
    pub sessions: Arc<dyn SessionLog>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the state around a single store that backs every storage port.
    pub fn with_store<S>(store: Arc<S>, config: Arc<Config>) -> Self
    where
        S: ImageLibrary + SettingsStore + SessionLog + 'static,
    {
        Self {
            images: store.clone(),
            settings: store.clone(),
            sessions: store,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Connects the Postgres store when `DATABASE_URL` is set, otherwise falls
    /// back to an in-memory store.
    pub async fn connect(config: Arc<Config>) -> StudioResult<Self> {
        match config.database_url.as_deref() {
            Some(database_url) => {
                info!("Connecting to database...");
                let db_pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .connect(database_url)
                    .await?;
                let store = Arc::new(PgStore::new(db_pool));
                info!("Running database migrations...");
                store.run_migrations().await?;
                info!("Database migrations complete.");
                Ok(Self::with_store(store, config))
            }
            None => {
                warn!("DATABASE_URL is not set; sessions will only be kept in memory.");
                Ok(Self::with_store(Arc::new(InMemoryStore::new()), config))
            }
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// A fresh permutation source for one session.
    pub fn shuffler(&self) -> Box<dyn Shuffler> {
        match self.config.shuffle_seed {
            Some(seed) => Box::new(SeededShuffler::new(seed)),
            None => Box::new(RandomShuffler),
        }
    }

    /// Imports a JSON array of images into the library, replacing same-id entries.
    pub async fn import_library(&self, path: &Path) -> StudioResult<usize> {
        let raw = tokio::fs::read_to_string(path).await?;
        let images: Vec<Image> = serde_json::from_str(&raw)?;
        let count = images.len();
        for image in images {
            self.images.save_image(image).await?;
        }
        info!("Imported {} images from {}", count, path.display());
        Ok(count)
    }
}
