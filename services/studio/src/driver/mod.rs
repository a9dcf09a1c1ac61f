pub mod discovery_task;
pub mod protocol;
pub mod state;

// Re-export the session runner to make it easily accessible
// to the binary that wires up stdin and stdout.
pub use discovery_task::{run_discovery, DiscoveryOutcome};
pub use protocol::{ClientMessage, ServerMessage};
pub use state::AppState;
