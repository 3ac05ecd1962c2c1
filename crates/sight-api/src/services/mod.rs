//! Business logic services.

pub mod announcer;
pub mod session_reaper;

pub use announcer::{AnnounceOutcome, Announcer};
pub use session_reaper::SessionReaper;
