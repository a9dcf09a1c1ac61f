//! services/studio/src/driver/protocol.rs
//!
//! Defines the message protocol between a presentation layer and the studio
//! host. Each message is one JSON object; the `studio` binary exchanges them as
//! lines on stdin/stdout.

use serde::{Deserialize, Serialize};
use style_discovery_core::domain::{RoomType, SessionResult, SwipeDirection};
use style_discovery_core::readiness::PoolReadiness;
use style_discovery_core::report::SummaryReport;

//=========================================================================================
// Messages Sent FROM the Client TO the Host
//=========================================================================================

/// Represents the commands a client can send to the host.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Opens a discovery session. Must be the first command of a session.
    Start {
        #[serde(default)]
        client_name: Option<String>,
    },

    /// Records a decision for the card currently presented.
    Swipe { direction: SwipeDirection },

    /// Retracts the most recent decision and re-presents its card.
    Undo,

    /// Abandons the session. Nothing is analysed or recorded.
    Cancel,
}

//=========================================================================================
// Messages Sent FROM the Host TO the Client
//=========================================================================================

/// Represents the events the host reports back to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The session stack has been built.
    SessionStarted { total: usize },

    /// The active pool is below the studio minimum; no session was opened.
    PoolNotReady { readiness: PoolReadiness },

    /// The card the client should judge next. `position` is zero-based.
    CardPresented {
        position: usize,
        total: usize,
        image_id: String,
        url: String,
        room_type: RoomType,
    },

    /// A decision was accepted. `position` is the number of decisions now on record.
    DecisionRecorded {
        position: usize,
        direction: SwipeDirection,
        response_time_ms: u64,
    },

    /// The last decision was retracted.
    UndoApplied { position: usize },

    /// The final card was judged; the result has been recorded.
    SessionCompleted {
        result: SessionResult,
        report: SummaryReport,
    },

    SessionCancelled,

    /// A command was rejected or the host hit a failure.
    Error { message: String },
}
