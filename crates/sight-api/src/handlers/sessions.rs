//! Session lifecycle handlers.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use sight_models::{AccumulationPolicy, SessionId};

use crate::error::{ApiError, ApiResult};
use crate::session::SessionSettings;
use crate::state::AppState;

/// Session creation request. All fields optional; process defaults
/// apply otherwise.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateSessionRequest {
    /// Cooldown override in milliseconds
    #[validate(range(min = 100, max = 600_000))]
    pub cooldown_ms: Option<u64>,
    /// Accumulation policy override
    pub accumulation: Option<AccumulationPolicy>,
}

/// Session creation response.
#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub cooldown_ms: u64,
    pub accumulation: AccumulationPolicy,
}

/// Create a session with explicit settings.
///
/// Sessions are also created implicitly on first ingest; this endpoint
/// exists because cooldown/policy overrides must be pinned before the
/// first frame arrives.
pub async fn create_session(
    State(state): State<AppState>,
    payload: Option<Json<CreateSessionRequest>>,
) -> ApiResult<Json<SessionResponse>> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    request.validate()?;

    let settings = SessionSettings {
        cooldown: request
            .cooldown_ms
            .map(Duration::from_millis)
            .unwrap_or(state.config.cooldown_window),
        policy: request.accumulation.unwrap_or(state.config.accumulation),
    };

    let session = state.sessions.create(settings).await;
    info!(session_id = %session.id, "Session created");

    Ok(Json(SessionResponse {
        session_id: session.id.clone(),
        cooldown_ms: settings.cooldown.as_millis() as u64,
        accumulation: settings.policy,
    }))
}

/// End a session and destroy its state.
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = SessionId::from(session_id);

    if state.sessions.remove(&id).await {
        info!(session_id = %id, "Session ended");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("session {id} not found")))
    }
}
