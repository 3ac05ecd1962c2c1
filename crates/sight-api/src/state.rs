//! Application state.

use std::sync::Arc;

use sight_detect::{Detector, YoloClient};
use sight_speech::{GoogleTtsClient, SpeechSynthesizer};

use crate::config::ApiConfig;
use crate::services::Announcer;
use crate::session::{SessionRegistry, SessionSettings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub sessions: Arc<SessionRegistry>,
    pub detector: Arc<dyn Detector>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub announcer: Announcer,
}

impl AppState {
    /// Create application state with collaborators built from the
    /// environment.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let detector: Arc<dyn Detector> = Arc::new(YoloClient::from_env()?);
        let speech: Arc<dyn SpeechSynthesizer> = Arc::new(GoogleTtsClient::from_env()?);
        Ok(Self::with_collaborators(config, detector, speech))
    }

    /// Create application state with injected collaborators.
    pub fn with_collaborators(
        config: ApiConfig,
        detector: Arc<dyn Detector>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(
            SessionSettings {
                cooldown: config.cooldown_window,
                policy: config.accumulation,
            },
            config.session_idle_ttl,
        ));
        let announcer = Announcer::new(Arc::clone(&speech));

        Self {
            config,
            sessions,
            detector,
            speech,
            announcer,
        }
    }
}
