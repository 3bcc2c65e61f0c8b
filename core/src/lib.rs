pub mod cli;
pub mod clock;
pub mod gait;
pub mod geo;
pub mod gpx;
pub mod metrics;
pub mod models;
pub mod py;
pub mod session;
pub mod storage;
pub mod store;
pub mod summary;
pub mod watcher;

pub use clock::{Clock, ManualClock, SystemClock};
pub use gait::GaitClassifier;
pub use models::{
    Fix, FixSource, Gait, Goal, HorseRef, Sample, SessionConfig, SessionState, SessionStats,
    SessionSummary, SessionType,
};
pub use session::{LaunchRejection, LiveSession, SaveError, SessionError};
pub use storage::{load_summary, save_summary};
pub use store::{HorseDirectory, HttpSessionStore, SessionStore, StoreError};
pub use watcher::{
    FixWatcher, LocationSource, PermissionStatus, SensorEvent, SensorFailure, WatcherState,
};
