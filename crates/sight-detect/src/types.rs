//! Detector sidecar request/response types.

use serde::{Deserialize, Serialize};

use sight_models::Detection;

/// Request for frame inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Base64-encoded image bytes
    pub image: String,
    /// Minimum confidence to report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f32>,
}

/// Response from frame inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    /// Detected objects, in the order the model reported them
    pub detections: Vec<Detection>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}
