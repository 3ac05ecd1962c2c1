//! YOLO sidecar HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use sight_models::Detection;

use crate::detector::Detector;
use crate::error::{DetectError, DetectResult};
use crate::types::{DetectRequest, DetectResponse, HealthResponse};

/// Configuration for the YOLO sidecar client.
#[derive(Debug, Clone)]
pub struct YoloClientConfig {
    /// Base URL of the inference service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries for transient failures
    pub max_retries: u32,
    /// Minimum confidence forwarded to the model
    pub min_confidence: Option<f32>,
}

impl Default for YoloClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
            min_confidence: Some(0.5),
        }
    }
}

impl YoloClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("DETECTOR_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            timeout: Duration::from_secs(
                std::env::var("DETECTOR_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            max_retries: std::env::var("DETECTOR_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            min_confidence: std::env::var("DETECTOR_MIN_CONFIDENCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(Some(0.5)),
        }
    }
}

/// HTTP client for the YOLO inference sidecar.
pub struct YoloClient {
    http: Client,
    config: YoloClientConfig,
}

impl YoloClient {
    /// Create a new client.
    pub fn new(config: YoloClientConfig) -> DetectResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DetectError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> DetectResult<Self> {
        Self::new(YoloClientConfig::from_env())
    }

    async fn post_detect(&self, request: &DetectRequest) -> DetectResult<Vec<Detection>> {
        let url = format!("{}/detect", self.config.base_url);

        debug!("Sending frame to detector at {}", url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(DetectError::Network)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DetectError::RequestFailed { status, body });
        }

        let detected: DetectResponse = response.json().await?;
        Ok(detected.detections)
    }

    /// Execute with retry logic for transient failures.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> DetectResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = DetectResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(250 * 2u64.pow(attempt));
                    warn!(
                        "Detection request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| DetectError::Unavailable("retries exhausted".to_string())))
    }
}

#[async_trait]
impl Detector for YoloClient {
    async fn detect(&self, image_base64: &str) -> DetectResult<Vec<Detection>> {
        let request = DetectRequest {
            image: image_base64.to_string(),
            min_confidence: self.config.min_confidence,
        };

        self.with_retry(|| self.post_detect(&request)).await
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<HealthResponse>().await {
                    Ok(health) => health.status == "healthy" || health.status == "ok",
                    Err(_) => false,
                }
            }
            Ok(response) => {
                warn!("Detector health check failed: {}", response.status());
                false
            }
            Err(e) => {
                warn!("Detector health check error: {}", e);
                false
            }
        }
    }
}
