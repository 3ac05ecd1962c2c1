//! Shared data models for the Sightline backend.
//!
//! This crate provides Serde-serializable types for:
//! - Detected objects and their class labels
//! - Label diffs and announcement phrasing
//! - Session identifiers and accumulation policy

pub mod announce;
pub mod detection;
pub mod session;

// Re-export common types
pub use announce::LabelDiff;
pub use detection::{BoundingBox, Detection, DetectionLabel};
pub use session::{AccumulationPolicy, SessionId};
