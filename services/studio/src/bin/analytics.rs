//! services/studio/src/bin/analytics.rs
//!
//! Prints the studio dashboard figures as pretty JSON: pool readiness plus the
//! analytics aggregated over every recorded session.

use serde::Serialize;
use std::sync::Arc;
use studio_lib::{config::Config, driver::AppState, error::StudioResult};
use style_discovery_core::analytics::StudioAnalytics;
use style_discovery_core::readiness::PoolReadiness;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct Dashboard {
    readiness: PoolReadiness,
    analytics: StudioAnalytics,
}

#[tokio::main]
async fn main() -> StudioResult<()> {
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let app_state = AppState::connect(config.clone()).await?;
    if let Some(path) = &config.library_path {
        app_state.import_library(path).await?;
    }

    let settings = app_state.settings.load_settings().await?;
    let library = app_state.images.list_images().await?;
    let sessions = app_state.sessions.list_sessions().await?;
    info!(
        "Aggregating {} sessions over {} images.",
        sessions.len(),
        library.len()
    );

    let dashboard = Dashboard {
        readiness: PoolReadiness::assess(&library, settings.min_required_images),
        analytics: StudioAnalytics::compute(
            &sessions,
            &library,
            &settings.categories,
            settings.min_required_images,
        ),
    };
    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}
