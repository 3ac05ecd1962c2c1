//! Speech synthesizer capability trait.

use async_trait::async_trait;

use crate::error::SpeechResult;
use crate::types::ArtifactRef;

/// An opaque capability that renders text to an audio artifact.
///
/// Callers must treat a call as cancellable: dropping the future before
/// it resolves means no artifact was produced.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return a reference to the stored audio.
    async fn synthesize(&self, text: &str) -> SpeechResult<ArtifactRef>;

    /// Whether the synthesizer is configured and able to serve.
    async fn ready(&self) -> bool {
        true
    }
}
