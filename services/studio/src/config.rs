//! services/studio/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// PostgreSQL connection string. Without one the service keeps everything in memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub log_level: Level,
    /// Fixed seed for session-stack shuffling; random when unset.
    pub shuffle_seed: Option<u64>,
    /// JSON array of images imported into the library at startup.
    pub library_path: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Database Settings ---
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let max_connections_str =
            lookup("DATABASE_MAX_CONNECTIONS").unwrap_or_else(|| "5".to_string());
        let database_max_connections = max_connections_str.parse::<u32>().map_err(|e| {
            ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Session Settings ---
        let shuffle_seed = lookup("SHUFFLE_SEED")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidValue("SHUFFLE_SEED".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let library_path = lookup("LIBRARY_PATH").map(PathBuf::from);

        Ok(Self {
            database_url,
            database_max_connections,
            log_level,
            shuffle_seed,
            library_path,
        })
    }
}
