//! Speech synthesis error types.

use thiserror::Error;

pub type SpeechResult<T> = Result<T, SpeechError>;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Synthesizer not configured: {0}")]
    NotConfigured(String),

    #[error("TTS service returned {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid audio payload: {0}")]
    InvalidAudio(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Artifact store error: {0}")]
    Store(#[from] std::io::Error),
}

impl From<base64::DecodeError> for SpeechError {
    fn from(e: base64::DecodeError) -> Self {
        SpeechError::InvalidAudio(e.to_string())
    }
}
