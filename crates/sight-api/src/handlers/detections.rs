//! Detection ingest handlers.
//!
//! This is the per-frame ingest/evaluate endpoint: the client reports
//! which object classes its frame contained, and the response says what
//! the announcer decided.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use sight_models::{DetectionLabel, SessionId};

use crate::metrics;
use crate::services::AnnounceOutcome;
use crate::state::AppState;

/// Ingest request: the labels one frame produced.
///
/// Serde defaults make a missing or malformed `detections` field an
/// empty frame, which ingestion treats as a no-op rather than an error.
#[derive(Debug, Default, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub detections: Vec<DetectionRecord>,
}

/// One reported object class. Duplicates within a frame collapse under
/// set union.
#[derive(Debug, Deserialize)]
pub struct DetectionRecord {
    #[serde(default)]
    pub class_name: String,
}

/// Announcement decision for one ingest call.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnnounceResponse {
    /// Cooldown active; labels accumulated
    Queued,
    /// Cooldown elapsed, nothing new
    NoChange,
    /// Announcement produced
    Emitted { text: String, artifact: String },
    /// Synthesis failed; the diff will be retried
    Error { message: String },
}

impl From<AnnounceOutcome> for AnnounceResponse {
    fn from(outcome: AnnounceOutcome) -> Self {
        match outcome {
            AnnounceOutcome::Queued => AnnounceResponse::Queued,
            AnnounceOutcome::NoChange => AnnounceResponse::NoChange,
            AnnounceOutcome::Emitted { text, artifact } => AnnounceResponse::Emitted {
                text,
                artifact: artifact.to_string(),
            },
        }
    }
}

/// Convert reported records into normalized labels.
pub(crate) fn labels_from_records(records: &[DetectionRecord]) -> Vec<DetectionLabel> {
    records
        .iter()
        .filter_map(|r| DetectionLabel::normalized(&r.class_name))
        .collect()
}

/// Ingest one frame's reported labels and evaluate the announcement
/// state. The session is created on first ingest.
pub async fn ingest_detections(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Option<Json<IngestRequest>>,
) -> Response {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let labels = labels_from_records(&request.detections);

    metrics::record_frame_ingested();

    let session = state
        .sessions
        .get_or_create(&SessionId::from(session_id))
        .await;

    match state.announcer.process(&session, labels).await {
        Ok(outcome) => (StatusCode::OK, Json(AnnounceResponse::from(outcome))).into_response(),
        Err(e) => {
            warn!(session_id = %session.id, "Announcement dispatch failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(AnnounceResponse::Error {
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
