//! Announcement scheduling and dispatch.
//!
//! One `process` call is one frame's journey through the core: ingest
//! and evaluation run inside the session's critical section, synthesis
//! runs outside it so later frames keep ingesting, and the commit
//! re-acquires the lock only after synthesis succeeded.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use sight_models::DetectionLabel;
use sight_speech::{ArtifactRef, SpeechError, SpeechSynthesizer};

use crate::metrics;
use crate::session::{Decision, Session};

/// Result of pushing one frame's labels through a session.
#[derive(Debug)]
pub enum AnnounceOutcome {
    /// Cooldown active; labels were accumulated silently
    Queued,
    /// Cooldown elapsed, nothing new to say
    NoChange,
    /// An announcement was synthesized and committed
    Emitted {
        text: String,
        artifact: ArtifactRef,
    },
}

impl AnnounceOutcome {
    /// Get string representation of the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnounceOutcome::Queued => "queued",
            AnnounceOutcome::NoChange => "no_change",
            AnnounceOutcome::Emitted { .. } => "emitted",
        }
    }
}

/// Drives sessions from ingested labels to spoken announcements.
#[derive(Clone)]
pub struct Announcer {
    speech: Arc<dyn SpeechSynthesizer>,
}

impl Announcer {
    /// Create an announcer around a speech synthesizer.
    pub fn new(speech: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { speech }
    }

    /// Ingest a frame's labels and, when the cooldown allows and the
    /// state changed, produce an announcement.
    ///
    /// A synthesis failure leaves the baseline and cooldown clock
    /// untouched, so the same diff is recomputed and retried at the next
    /// post-cooldown evaluation. Dropping the future mid-synthesis has
    /// the same effect: nothing was committed.
    pub async fn process(
        &self,
        session: &Session,
        labels: Vec<DetectionLabel>,
    ) -> Result<AnnounceOutcome, SpeechError> {
        let decision = {
            let mut state = session.lock().await;
            let now = Instant::now();
            state.touch(now);
            state.ingest(labels);
            state.evaluate(now)
        };

        let (diff, snapshot) = match decision {
            Decision::Queued => {
                metrics::record_announcement("queued");
                return Ok(AnnounceOutcome::Queued);
            }
            Decision::NoChange => {
                metrics::record_announcement("no_change");
                return Ok(AnnounceOutcome::NoChange);
            }
            Decision::ReadyToEmit { diff, snapshot } => (diff, snapshot),
        };

        let text = diff.phrase();
        debug!(session_id = %session.id, "Dispatching announcement: {:?}", text);

        // The synthesizer may be slow; the session lock is not held here.
        let artifact = match self.speech.synthesize(&text).await {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(session_id = %session.id, "Synthesis failed, diff will be retried: {}", e);
                metrics::record_synthesis_failure();
                return Err(e);
            }
        };

        {
            let mut state = session.lock().await;
            state.commit(snapshot, Instant::now());
        }

        info!(session_id = %session.id, artifact = %artifact, "Announcement emitted");
        metrics::record_announcement("emitted");

        Ok(AnnounceOutcome::Emitted { text, artifact })
    }
}
