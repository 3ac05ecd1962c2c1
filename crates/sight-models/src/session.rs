//! Session identity and accumulation policy.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a camera session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How the accumulated label set evolves across frames.
///
/// Under `Lifetime`, labels only ever union in, so a removal can only be
/// announced if the baseline shrinks relative to the accumulator. Under
/// `PerFrame`, each non-empty frame replaces the set, which makes
/// "no longer see" announcements meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationPolicy {
    /// Union every frame's labels into the set for the session's lifetime
    #[default]
    Lifetime,
    /// Replace the set with each non-empty frame's labels
    PerFrame,
}

impl AccumulationPolicy {
    /// Get string representation of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccumulationPolicy::Lifetime => "lifetime",
            AccumulationPolicy::PerFrame => "per_frame",
        }
    }
}

impl fmt::Display for AccumulationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_policy_serialization() {
        let json = serde_json::to_string(&AccumulationPolicy::PerFrame).unwrap();
        assert_eq!(json, "\"per_frame\"");
        let policy: AccumulationPolicy = serde_json::from_str("\"lifetime\"").unwrap();
        assert_eq!(policy, AccumulationPolicy::Lifetime);
    }

    #[test]
    fn test_policy_default_is_lifetime() {
        assert_eq!(AccumulationPolicy::default(), AccumulationPolicy::Lifetime);
    }
}
