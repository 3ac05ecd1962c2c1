//! Frame ingest handlers.
//!
//! The camera client can ship the raw frame instead of labels; the
//! server runs the detector sidecar and feeds the result through the
//! same ingest/evaluate path as the detections endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use sight_models::{Detection, DetectionLabel, SessionId};

use crate::error::ApiError;
use crate::handlers::detections::AnnounceResponse;
use crate::metrics;
use crate::state::AppState;

/// Frame ingest request.
#[derive(Debug, Deserialize)]
pub struct FrameRequest {
    /// Base64 image bytes, with or without a `data:image/...;base64,`
    /// prefix (browsers send canvas captures as data URLs)
    pub image: String,
}

/// Frame ingest response: what was detected plus the announcement
/// decision.
#[derive(Serialize)]
pub struct FrameResponse {
    pub detections: Vec<Detection>,
    pub announcement: AnnounceResponse,
}

/// Detect objects in a frame and evaluate the announcement state.
pub async fn ingest_frame(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<FrameRequest>,
) -> Response {
    let image = strip_data_url(&request.image);
    if image.is_empty() {
        return ApiError::bad_request("missing frame image").into_response();
    }

    metrics::record_frame_ingested();

    let detections = match state.detector.detect(image).await {
        Ok(detections) => detections,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let labels: Vec<DetectionLabel> = detections
        .iter()
        .filter_map(|d| DetectionLabel::normalized(d.label.as_str()))
        .collect();

    let session = state
        .sessions
        .get_or_create(&SessionId::from(session_id))
        .await;

    match state.announcer.process(&session, labels).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(FrameResponse {
                detections,
                announcement: outcome.into(),
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(session_id = %session.id, "Announcement dispatch failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(FrameResponse {
                    detections,
                    announcement: AnnounceResponse::Error {
                        message: e.to_string(),
                    },
                }),
            )
                .into_response()
        }
    }
}

/// Strip a `data:image/...;base64,` prefix if present.
fn strip_data_url(image: &str) -> &str {
    match image.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => image,
    }
}
