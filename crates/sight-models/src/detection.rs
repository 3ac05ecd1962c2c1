//! Detected object models.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Class label of a detected object (e.g. "person", "bicycle").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DetectionLabel(pub String);

impl DetectionLabel {
    /// Create from an existing string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Normalize a raw class name reported by a detector.
    ///
    /// Surrounding whitespace is stripped; an empty result yields `None`
    /// so blank records collapse to a no-op instead of polluting the
    /// accumulated set.
    pub fn normalized(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DetectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DetectionLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DetectionLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// A single detected object within a frame.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Object class label
    pub label: DetectionLabel,
    /// Detector confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Bounding box, when the detector reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl Detection {
    /// Create a detection with just a label.
    pub fn labeled(label: impl Into<DetectionLabel>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_normalization() {
        assert_eq!(
            DetectionLabel::normalized("  cat "),
            Some(DetectionLabel::new("cat"))
        );
        assert_eq!(DetectionLabel::normalized("   "), None);
        assert_eq!(DetectionLabel::normalized(""), None);
    }

    #[test]
    fn test_label_serializes_transparent() {
        let label = DetectionLabel::new("traffic light");
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, "\"traffic light\"");
    }

    #[test]
    fn test_detection_deserializes_without_bbox() {
        let json = r#"{"label": "dog", "confidence": 0.91}"#;
        let det: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(det.label.as_str(), "dog");
        assert!(det.bbox.is_none());
    }
}
