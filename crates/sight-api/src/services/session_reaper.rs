//! Background eviction of abandoned sessions.
//!
//! Clients are expected to end their session explicitly, but a camera
//! page that loses power or network never will. This service runs
//! periodically and drops sessions that have not seen a frame within
//! the configured idle TTL.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::info;

use crate::metrics;
use crate::session::SessionRegistry;

/// Interval between reap cycles.
const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Idle session reaper.
pub struct SessionReaper {
    sessions: Arc<SessionRegistry>,
    enabled: bool,
}

impl SessionReaper {
    /// Create a new reaper.
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        let enabled = std::env::var("ENABLE_SESSION_REAPER")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        Self { sessions, enabled }
    }

    /// Start the background reap loop.
    ///
    /// Runs indefinitely; spawn as a background task.
    pub async fn run(&self) {
        if !self.enabled {
            info!("Session reaping is disabled");
            return;
        }

        info!("Starting session reaper (interval: {:?})", REAP_INTERVAL);

        let mut ticker = interval(REAP_INTERVAL);

        loop {
            ticker.tick().await;

            let reaped = self.sessions.reap_idle().await;
            if reaped > 0 {
                info!("Reaped {} idle session(s)", reaped);
            }
            metrics::set_active_sessions(self.sessions.len().await as i64);
        }
    }
}
