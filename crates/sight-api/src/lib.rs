//! Axum HTTP API server for the Sightline backend.
//!
//! This crate provides:
//! - Per-session detection accumulation with cooldown-gated announcements
//! - Frame ingest through the detector sidecar
//! - Session lifecycle endpoints and idle reaping
//! - Rate limiting and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{AnnounceOutcome, Announcer, SessionReaper};
pub use session::{Decision, Session, SessionRegistry, SessionSettings, SessionState};
pub use state::AppState;
