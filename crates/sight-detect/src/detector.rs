//! Detector capability trait.

use async_trait::async_trait;

use sight_models::Detection;

use crate::error::DetectResult;

/// An opaque capability that turns a frame into detected objects.
///
/// Frames arrive as base64-encoded image bytes (the wire format the
/// camera client already sends). Implementations decide how inference
/// actually happens.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Run detection on a single frame.
    async fn detect(&self, image_base64: &str) -> DetectResult<Vec<Detection>>;

    /// Whether the detector is reachable and ready to serve.
    async fn health_check(&self) -> bool;
}
