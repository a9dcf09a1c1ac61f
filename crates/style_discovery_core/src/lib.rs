pub mod analytics;
pub mod clock;
pub mod domain;
pub mod inference;
pub mod narrative;
pub mod ports;
pub mod readiness;
pub mod report;
pub mod session;
pub mod shuffle;

pub use analytics::{StudioAnalytics, StyleShare};
pub use clock::{ManualClock, SystemClock};
pub use domain::{
    Confidence, Image, RoomType, SessionResult, StudioSettings, StyleCategory, Summary,
    SwipeDecision, SwipeDirection,
};
pub use inference::analyze;
pub use ports::{Clock, ImageLibrary, PortError, PortResult, SessionLog, SettingsStore, Shuffler};
pub use readiness::PoolReadiness;
pub use report::{SummaryReport, TimingLabel};
pub use session::{SessionCommand, SessionController, SessionPhase, SessionState, Step};
pub use shuffle::{IdentityShuffler, RandomShuffler, SeededShuffler};
