//! services/studio/src/driver/discovery_task.rs
//!
//! The control loop for one discovery session. Commands arrive on a stream,
//! events leave on a channel, and the session controller does the rest.

use crate::driver::{
    protocol::{ClientMessage, ServerMessage},
    state::AppState,
};
use crate::error::StudioResult;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use style_discovery_core::domain::SessionResult;
use style_discovery_core::readiness::PoolReadiness;
use style_discovery_core::report::SummaryReport;
use style_discovery_core::session::{SessionController, SessionState};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How a discovery run ended.
#[derive(Debug)]
pub enum DiscoveryOutcome {
    /// The last card was judged and the result appended to the session log.
    Completed(SessionResult),
    /// The client cancelled, disconnected, or the host was interrupted.
    Cancelled,
    /// The active pool was too small to open a session.
    NotReady(PoolReadiness),
}

fn emit(events: &UnboundedSender<ServerMessage>, message: ServerMessage) {
    if events.send(message).is_err() {
        warn!("Event receiver dropped; client will not see further events.");
    }
}

fn present_card(events: &UnboundedSender<ServerMessage>, state: &SessionState) {
    if let Some(card) = state.current_card() {
        emit(
            events,
            ServerMessage::CardPresented {
                position: state.position(),
                total: state.stack().len(),
                image_id: card.id.clone(),
                url: card.url.clone(),
                room_type: card.room_type,
            },
        );
    }
}

fn reject(events: &UnboundedSender<ServerMessage>, message: &str) {
    warn!("Rejected command: {}", message);
    emit(
        events,
        ServerMessage::Error {
            message: message.to_string(),
        },
    );
}

/// Runs one discovery session to its end.
///
/// The first command must be `start`. Commands that do not apply in the current
/// state are answered with an `error` event and otherwise ignored. Cancelling,
/// ending the command stream, or firing `cancellation` discards the session
/// without analysing it.
pub async fn run_discovery<S>(
    app_state: Arc<AppState>,
    mut commands: S,
    events: UnboundedSender<ServerMessage>,
    cancellation: CancellationToken,
) -> StudioResult<DiscoveryOutcome>
where
    S: Stream<Item = ClientMessage> + Unpin,
{
    // --- 1. Wait for the Start Command ---
    let client_name = loop {
        let next = tokio::select! {
            _ = cancellation.cancelled() => None,
            message = commands.next() => message,
        };
        match next {
            Some(ClientMessage::Start { client_name }) => break client_name,
            Some(ClientMessage::Cancel) | None => {
                info!("Discovery abandoned before it started.");
                emit(&events, ServerMessage::SessionCancelled);
                return Ok(DiscoveryOutcome::Cancelled);
            }
            Some(_) => reject(&events, "No session in progress; send a start command first."),
        }
    };

    // --- 2. Load the Library and Gate on Pool Size ---
    let settings = app_state.settings.load_settings().await?;
    let library = app_state.images.list_images().await?;
    let readiness = PoolReadiness::assess(&library, settings.min_required_images);
    if !readiness.is_ready || readiness.pool_size == 0 {
        warn!(
            "Discovery refused: {} active images, {} required.",
            readiness.pool_size, readiness.min_required
        );
        emit(&events, ServerMessage::PoolNotReady { readiness });
        return Ok(DiscoveryOutcome::NotReady(readiness));
    }

    // --- 3. Build the Session Stack ---
    let mut controller = SessionController::new(
        settings.categories.clone(),
        app_state.clock.clone(),
        app_state.shuffler(),
    )
    .with_client_name(client_name);
    let step = controller.start(library.clone(), settings.target_length());
    info!(
        "Session stack ready: {} of {} active images.",
        step.state.stack().len(),
        readiness.pool_size
    );
    emit(
        &events,
        ServerMessage::SessionStarted {
            total: step.state.stack().len(),
        },
    );
    present_card(&events, &step.state);

    // --- 4. Main Command Loop ---
    loop {
        let next = tokio::select! {
            _ = cancellation.cancelled() => None,
            message = commands.next() => message,
        };

        match next {
            Some(ClientMessage::Swipe { direction }) => {
                let step = controller.swipe(direction);
                if !step.applied {
                    reject(&events, "There is no card awaiting a decision.");
                    continue;
                }
                if let Some(decision) = step.state.decisions().last() {
                    emit(
                        &events,
                        ServerMessage::DecisionRecorded {
                            position: step.state.position(),
                            direction: decision.direction,
                            response_time_ms: decision.response_time_ms,
                        },
                    );
                }

                if let Some(result) = step.result {
                    if let Err(e) = app_state.sessions.append_session(&result).await {
                        error!("Failed to record session {}: {:?}", result.id, e);
                        emit(
                            &events,
                            ServerMessage::Error {
                                message: "Failed to record the session result.".to_string(),
                            },
                        );
                        return Err(e.into());
                    }
                    emit(
                        &events,
                        ServerMessage::SessionCompleted {
                            report: SummaryReport::build(&result, &library),
                            result: result.clone(),
                        },
                    );
                    return Ok(DiscoveryOutcome::Completed(result));
                }

                present_card(&events, &step.state);
            }
            Some(ClientMessage::Undo) => {
                let step = controller.undo();
                if !step.applied {
                    reject(&events, "Nothing to undo.");
                    continue;
                }
                emit(
                    &events,
                    ServerMessage::UndoApplied {
                        position: step.state.position(),
                    },
                );
                present_card(&events, &step.state);
            }
            Some(ClientMessage::Start { .. }) => {
                reject(&events, "A session is already in progress.");
            }
            Some(ClientMessage::Cancel) | None => {
                info!(
                    "Discovery cancelled after {} decisions.",
                    controller.state().decisions().len()
                );
                emit(&events, ServerMessage::SessionCancelled);
                return Ok(DiscoveryOutcome::Cancelled);
            }
        }
    }
}
