//! services/studio/src/bin/studio.rs
//!
//! Runs one discovery session against the configured store. Commands are read
//! as JSON lines from stdin and events are written as JSON lines to stdout;
//! logs go to stderr.

use futures::stream;
use std::sync::Arc;
use studio_lib::{
    config::Config,
    driver::{run_discovery, AppState, ClientMessage, DiscoveryOutcome, ServerMessage},
    error::{StudioError, StudioResult},
};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> StudioResult<()> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Starting studio...");

    // --- 2. Connect the Store & Import the Library ---
    let app_state = Arc::new(AppState::connect(config.clone()).await?);
    if let Some(path) = &config.library_path {
        app_state.import_library(path).await?;
    }

    // --- 3. Wire stdout ---
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = event_rx.recv().await {
            let line = match serde_json::to_string(&event) {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to encode event: {}", e);
                    continue;
                }
            };
            if stdout.write_all(format!("{}\n", line).as_bytes()).await.is_err()
                || stdout.flush().await.is_err()
            {
                error!("stdout closed; dropping remaining events.");
                break;
            }
        }
    });

    // --- 4. Wire stdin ---
    // A plain thread does the blocking reads; it is left behind at exit while
    // still parked on a read.
    let (command_tx, command_rx) = mpsc::unbounded_channel::<Result<ClientMessage, String>>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to read stdin: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<ClientMessage>(&line).map_err(|e| {
                warn!("Unreadable command {:?}: {}", line, e);
                format!("Unreadable command: {}", e)
            });
            if command_tx.send(parsed).is_err() {
                break;
            }
        }
    });
    // Unreadable lines are reported here, so the stream owns the only extra
    // event sender and drops it together with the session.
    let commands = Box::pin(stream::unfold(
        (command_rx, event_tx.clone()),
        |(mut rx, events)| async move {
            loop {
                match rx.recv().await? {
                    Ok(command) => return Some((command, (rx, events))),
                    Err(message) => {
                        if events.send(ServerMessage::Error { message }).is_err() {
                            warn!("Event receiver dropped; client will not see further events.");
                        }
                    }
                }
            }
        },
    ));

    // --- 5. Cancel on Ctrl-C ---
    let cancellation = CancellationToken::new();
    let interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received; cancelling the session.");
            interrupt.cancel();
        }
    });

    // --- 6. Run the Session ---
    let outcome = run_discovery(app_state, commands, event_tx, cancellation).await;
    match &outcome {
        Ok(DiscoveryOutcome::Completed(result)) => {
            info!("Session {} recorded.", result.id)
        }
        Ok(DiscoveryOutcome::Cancelled) => info!("Session cancelled."),
        Ok(DiscoveryOutcome::NotReady(readiness)) => info!(
            "Add {} more active images to open a discovery session.",
            readiness.remaining
        ),
        Err(e) => error!("Session failed: {}", e),
    }

    // Every event sender is gone once the session returns; wait for the writer to drain.
    writer
        .await
        .map_err(|e| StudioError::Internal(format!("event writer failed: {}", e)))?;
    outcome.map(|_| ())
}
