//! TTS request/response types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to a stored audio artifact (file stem, no extension).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(pub String);

impl ArtifactRef {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Google TTS synthesis request.
#[derive(Debug, Serialize)]
pub struct SynthesizeRequest {
    pub input: SynthesisInput,
    pub voice: VoiceSelection,
    #[serde(rename = "audioConfig")]
    pub audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
pub struct SynthesisInput {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct VoiceSelection {
    #[serde(rename = "languageCode")]
    pub language_code: String,
    #[serde(rename = "ssmlGender")]
    pub ssml_gender: String,
}

#[derive(Debug, Serialize)]
pub struct AudioConfig {
    #[serde(rename = "audioEncoding")]
    pub audio_encoding: String,
}

/// Google TTS synthesis response.
#[derive(Debug, Deserialize)]
pub struct SynthesizeResponse {
    /// Base64-encoded audio bytes
    #[serde(rename = "audioContent")]
    pub audio_content: String,
}

impl SynthesizeRequest {
    /// Build a request with the given voice settings.
    pub fn new(text: impl Into<String>, language_code: &str, ssml_gender: &str) -> Self {
        Self {
            input: SynthesisInput { text: text.into() },
            voice: VoiceSelection {
                language_code: language_code.to_string(),
                ssml_gender: ssml_gender.to_string(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3".to_string(),
            },
        }
    }
}
