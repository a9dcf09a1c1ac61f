//! crates/style_discovery_core/src/session.rs
//!
//! The session controller: owns one discovery session from stack selection to
//! the finished `SessionResult`.
//!
//! State is an immutable record. Every accepted command produces a fresh
//! `SessionState`, and the controller keeps the full list of states so each
//! transition can be inspected after the fact. Commands that do not apply in the
//! current state (a swipe after completion, an undo with nothing to undo) are
//! silent no-ops.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Image, SessionResult, StyleCategory, SwipeDecision, SwipeDirection};
use crate::inference;
use crate::ports::{Clock, Shuffler};

//=========================================================================================
// Session State
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    InSession,
    Completed,
}

/// A snapshot of one session. Transitions return a new snapshot and never
/// modify the one they were called on.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    stack: Arc<[Image]>,
    position: usize,
    decisions: Vec<SwipeDecision>,
    last_decision_at: DateTime<Utc>,
    undo_armed: bool,
    undo_consumed_for_current: bool,
    phase: SessionPhase,
}

impl SessionState {
    pub fn idle(now: DateTime<Utc>) -> Self {
        Self {
            stack: Arc::from(Vec::new()),
            position: 0,
            decisions: Vec::new(),
            last_decision_at: now,
            undo_armed: false,
            undo_consumed_for_current: false,
            phase: SessionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn stack(&self) -> &[Image] {
        &self.stack
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn decisions(&self) -> &[SwipeDecision] {
        &self.decisions
    }

    /// The card awaiting a decision, if any.
    pub fn current_card(&self) -> Option<&Image> {
        match self.phase {
            SessionPhase::InSession => self.stack.get(self.position),
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.phase == SessionPhase::InSession && self.undo_armed && self.position > 0
    }

    /// Whether the next decision will be recorded as following an undo.
    pub fn undo_pending(&self) -> bool {
        self.undo_consumed_for_current
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    /// Builds the session stack from the active part of `pool`.
    ///
    /// Only valid from `Idle`. The stack holds `min(target_length, active pool)`
    /// images in shuffled order; an empty active pool yields an empty stack,
    /// which callers are expected to refuse before starting.
    pub fn started(
        &self,
        pool: &[Image],
        target_length: usize,
        shuffler: &mut dyn Shuffler,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if self.phase != SessionPhase::Idle {
            return None;
        }

        let active: Vec<&Image> = pool.iter().filter(|img| img.active).collect();
        let stack: Vec<Image> = shuffler
            .permutation(active.len())
            .into_iter()
            .filter_map(|i| active.get(i).copied())
            .take(target_length)
            .cloned()
            .collect();

        Some(Self {
            stack: Arc::from(stack),
            position: 0,
            decisions: Vec::new(),
            last_decision_at: now,
            undo_armed: false,
            undo_consumed_for_current: false,
            phase: SessionPhase::InSession,
        })
    }

    /// Records a decision for the current card and advances.
    pub fn swiped(&self, direction: SwipeDirection, now: DateTime<Utc>) -> Option<Self> {
        let card = self.current_card()?;

        let response_time_ms = (now - self.last_decision_at).num_milliseconds().max(0) as u64;
        let mut decisions = self.decisions.clone();
        decisions.push(SwipeDecision {
            image_id: card.id.clone(),
            direction,
            response_time_ms,
            undo_used: self.undo_consumed_for_current,
            room_type: card.room_type,
            style_categories: card.style_categories.clone(),
        });

        let position = self.position + 1;
        let phase = if position == self.stack.len() {
            SessionPhase::Completed
        } else {
            SessionPhase::InSession
        };

        Some(Self {
            stack: Arc::clone(&self.stack),
            position,
            decisions,
            last_decision_at: now,
            undo_armed: true,
            undo_consumed_for_current: false,
            phase,
        })
    }

    /// Retracts the last decision and re-presents its card.
    ///
    /// Only one step back is reachable: a second undo before the next swipe
    /// is a no-op.
    pub fn undone(&self, now: DateTime<Utc>) -> Option<Self> {
        if !self.can_undo() {
            return None;
        }

        let mut decisions = self.decisions.clone();
        decisions.pop();

        Some(Self {
            stack: Arc::clone(&self.stack),
            position: self.position - 1,
            decisions,
            last_decision_at: now,
            undo_armed: false,
            undo_consumed_for_current: true,
            phase: SessionPhase::InSession,
        })
    }
}

//=========================================================================================
// Commands and the Controller
//=========================================================================================

#[derive(Debug, Clone)]
pub enum SessionCommand {
    Start { pool: Vec<Image>, target_length: usize },
    Swipe(SwipeDirection),
    Undo,
}

/// What handling one command produced.
#[derive(Debug, Clone)]
pub struct Step {
    pub state: SessionState,
    /// False when the command was a no-op in the state it arrived in.
    pub applied: bool,
    /// Present exactly once: on the swipe that completes the session.
    pub result: Option<SessionResult>,
}

/// Drives one session through the message-passing interface.
pub struct SessionController {
    clock: Arc<dyn Clock>,
    shuffler: Box<dyn Shuffler>,
    catalog: Vec<StyleCategory>,
    client_name: Option<String>,
    current: SessionState,
    history: Vec<SessionState>,
    result: Option<SessionResult>,
}

impl SessionController {
    pub fn new(
        catalog: Vec<StyleCategory>,
        clock: Arc<dyn Clock>,
        shuffler: Box<dyn Shuffler>,
    ) -> Self {
        let initial = SessionState::idle(clock.now());
        Self {
            clock,
            shuffler,
            catalog,
            client_name: None,
            current: initial.clone(),
            history: vec![initial],
            result: None,
        }
    }

    pub fn with_client_name(mut self, client_name: Option<String>) -> Self {
        self.client_name = client_name.filter(|name| !name.trim().is_empty());
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.current
    }

    /// Every state the session has been in, oldest first.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn handle(&mut self, command: SessionCommand) -> Step {
        let now = self.clock.now();
        let current = &self.current;

        let next = match &command {
            SessionCommand::Start { pool, target_length } => {
                current.started(pool, *target_length, self.shuffler.as_mut(), now)
            }
            SessionCommand::Swipe(direction) => current.swiped(*direction, now),
            SessionCommand::Undo => current.undone(now),
        };

        let Some(next) = next else {
            debug!(command = command_name(&command), "Command ignored in current session state.");
            return Step {
                state: self.current.clone(),
                applied: false,
                result: None,
            };
        };

        match &command {
            SessionCommand::Start { .. } => {
                info!(cards = next.stack().len(), "Discovery session started.");
            }
            SessionCommand::Swipe(direction) => {
                if let Some(decision) = next.decisions().last() {
                    debug!(
                        position = next.position(),
                        ?direction,
                        response_time_ms = decision.response_time_ms,
                        undo_used = decision.undo_used,
                        "Decision recorded."
                    );
                }
            }
            SessionCommand::Undo => {
                debug!(position = next.position(), "Last decision undone.");
            }
        }

        let result = next.is_completed().then(|| self.complete(&next, now));
        self.history.push(next.clone());
        self.current = next.clone();

        Step {
            state: next,
            applied: true,
            result,
        }
    }

    pub fn start(&mut self, pool: Vec<Image>, target_length: usize) -> Step {
        self.handle(SessionCommand::Start { pool, target_length })
    }

    pub fn swipe(&mut self, direction: SwipeDirection) -> Step {
        self.handle(SessionCommand::Swipe(direction))
    }

    pub fn undo(&mut self) -> Step {
        self.handle(SessionCommand::Undo)
    }

    fn complete(&mut self, state: &SessionState, now: DateTime<Utc>) -> SessionResult {
        let summary = inference::analyze(state.decisions(), &self.catalog);
        let result = SessionResult {
            id: Uuid::new_v4(),
            date: now,
            client_name: self.client_name.clone(),
            decisions: state.decisions().to_vec(),
            summary,
        };
        info!(
            session_id = %result.id,
            decisions = result.decisions.len(),
            confidence = result.summary.confidence.as_str(),
            decisiveness = result.summary.decisiveness,
            "Discovery session completed."
        );
        self.result = Some(result.clone());
        result
    }
}

fn command_name(command: &SessionCommand) -> &'static str {
    match command {
        SessionCommand::Start { .. } => "start",
        SessionCommand::Swipe(_) => "swipe",
        SessionCommand::Undo => "undo",
    }
}
