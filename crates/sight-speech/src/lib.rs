//! Speech synthesis for the Sightline backend.
//!
//! This crate provides:
//! - The [`SpeechSynthesizer`] capability trait
//! - A Google Cloud Text-to-Speech REST client
//! - A local MP3 artifact store for rendered announcements

pub mod artifact;
pub mod client;
pub mod error;
pub mod synthesizer;
pub mod types;

pub use artifact::ArtifactStore;
pub use client::{GoogleTtsClient, TtsConfig};
pub use error::{SpeechError, SpeechResult};
pub use synthesizer::SpeechSynthesizer;
pub use types::ArtifactRef;
