//! Direct text-to-speech handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Synthesis request.
#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
}

/// Synthesis response.
#[derive(Serialize)]
pub struct SpeechResponse {
    pub artifact: String,
}

/// Synthesize arbitrary text without touching any session state.
pub async fn synthesize_text(
    State(state): State<AppState>,
    Json(request): Json<SpeechRequest>,
) -> ApiResult<Json<SpeechResponse>> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::bad_request("text must not be empty"));
    }

    let artifact = state.speech.synthesize(text).await?;

    Ok(Json(SpeechResponse {
        artifact: artifact.to_string(),
    }))
}
