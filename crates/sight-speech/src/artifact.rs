//! Local MP3 artifact store.
//!
//! Rendered announcements land on disk as `announcement_<millis>.mp3`;
//! the returned reference is the file stem, which is what the API hands
//! back to clients.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SpeechResult;
use crate::types::ArtifactRef;

/// Filesystem store for synthesized audio.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        let root = std::env::var("ARTIFACT_DIR").unwrap_or_else(|_| "artifacts".to_string());
        Self::new(root)
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the store's directory exists or can be created.
    pub async fn writable(&self) -> bool {
        tokio::fs::create_dir_all(&self.root).await.is_ok()
    }

    /// Persist MP3 bytes and return the artifact reference.
    pub async fn write_mp3(&self, audio: &[u8]) -> SpeechResult<ArtifactRef> {
        tokio::fs::create_dir_all(&self.root).await?;

        let stem = format!("announcement_{}", chrono::Utc::now().timestamp_millis());
        let path = self.root.join(format!("{stem}.mp3"));

        tokio::fs::write(&path, audio).await?;
        debug!("Stored audio artifact at {}", path.display());

        Ok(ArtifactRef::from_string(stem))
    }

    /// Resolve an artifact reference back to its file path.
    pub fn path_for(&self, artifact: &ArtifactRef) -> PathBuf {
        self.root.join(format!("{}.mp3", artifact.as_str()))
    }
}
