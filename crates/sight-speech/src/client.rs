//! Google Cloud Text-to-Speech REST client.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use tracing::{debug, warn};

use crate::artifact::ArtifactStore;
use crate::error::{SpeechError, SpeechResult};
use crate::synthesizer::SpeechSynthesizer;
use crate::types::{ArtifactRef, SynthesizeRequest, SynthesizeResponse};

const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Configuration for the TTS client.
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Synthesis endpoint URL
    pub endpoint: String,
    /// API key passed as a query parameter
    pub api_key: String,
    /// Voice language code
    pub language_code: String,
    /// Voice gender
    pub ssml_gender: String,
    /// Request timeout
    pub timeout: Duration,
}

impl TtsConfig {
    /// Create config from environment variables.
    ///
    /// Fails when `TTS_API_KEY` is unset: a speech service that cannot
    /// speak should not boot.
    pub fn from_env() -> SpeechResult<Self> {
        let api_key = std::env::var("TTS_API_KEY")
            .map_err(|_| SpeechError::NotConfigured("TTS_API_KEY not set".to_string()))?;

        Ok(Self {
            endpoint: std::env::var("TTS_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            api_key,
            language_code: std::env::var("TTS_LANGUAGE").unwrap_or_else(|_| "en-US".to_string()),
            ssml_gender: std::env::var("TTS_GENDER").unwrap_or_else(|_| "NEUTRAL".to_string()),
            timeout: Duration::from_secs(
                std::env::var("TTS_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15),
            ),
        })
    }
}

/// Google TTS client that stores rendered audio in an [`ArtifactStore`].
pub struct GoogleTtsClient {
    http: Client,
    config: TtsConfig,
    store: ArtifactStore,
}

impl GoogleTtsClient {
    /// Create a new client.
    pub fn new(config: TtsConfig, store: ArtifactStore) -> SpeechResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SpeechError::Network)?;

        Ok(Self { http, config, store })
    }

    /// Create from environment variables.
    pub fn from_env() -> SpeechResult<Self> {
        Self::new(TtsConfig::from_env()?, ArtifactStore::from_env())
    }

    /// The artifact store backing this client.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    async fn call_tts(&self, text: &str) -> SpeechResult<Vec<u8>> {
        let url = format!("{}?key={}", self.config.endpoint, self.config.api_key);
        let request =
            SynthesizeRequest::new(text, &self.config.language_code, &self.config.ssml_gender);

        debug!("Requesting synthesis of {} chars", text.len());

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(SpeechError::Network)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!("TTS request failed with {}", status);
            return Err(SpeechError::RequestFailed { status, body });
        }

        let synthesized: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidAudio(e.to_string()))?;

        Ok(STANDARD.decode(synthesized.audio_content)?)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsClient {
    async fn synthesize(&self, text: &str) -> SpeechResult<ArtifactRef> {
        let audio = self.call_tts(text).await?;
        self.store.write_mp3(&audio).await
    }

    async fn ready(&self) -> bool {
        !self.config.api_key.is_empty() && self.store.writable().await
    }
}
