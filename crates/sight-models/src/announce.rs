//! Announcement diff and phrasing.
//!
//! The phrasing is deterministic: labels are joined in the order they
//! first entered the respective diff set, so the same diff always
//! produces the same sentence.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::detection::DetectionLabel;

/// Difference between the accumulated labels and the last-announced
/// baseline, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LabelDiff {
    /// Labels present now but not in the baseline
    pub added: Vec<DetectionLabel>,
    /// Labels in the baseline no longer present
    pub removed: Vec<DetectionLabel>,
}

impl LabelDiff {
    /// Create a diff from added and removed label lists.
    pub fn new(
        added: impl IntoIterator<Item = DetectionLabel>,
        removed: impl IntoIterator<Item = DetectionLabel>,
    ) -> Self {
        Self {
            added: added.into_iter().collect(),
            removed: removed.into_iter().collect(),
        }
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Render the diff as announcement text.
    ///
    /// Added labels come first as `"I now see a, b. "`, removed labels
    /// follow as `"I no longer see c."`. Callers skip empty diffs.
    pub fn phrase(&self) -> String {
        let mut text = String::new();
        if !self.added.is_empty() {
            text.push_str(&format!("I now see {}. ", join(&self.added)));
        }
        if !self.removed.is_empty() {
            text.push_str(&format!("I no longer see {}.", join(&self.removed)));
        }
        text
    }
}

fn join(labels: &[DetectionLabel]) -> String {
    labels
        .iter()
        .map(DetectionLabel::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<DetectionLabel> {
        names.iter().map(|n| DetectionLabel::new(*n)).collect()
    }

    #[test]
    fn test_phrase_added_only() {
        let diff = LabelDiff::new(labels(&["cat"]), []);
        assert_eq!(diff.phrase(), "I now see cat. ");
    }

    #[test]
    fn test_phrase_removed_only() {
        let diff = LabelDiff::new([], labels(&["bicycle"]));
        assert_eq!(diff.phrase(), "I no longer see bicycle.");
    }

    #[test]
    fn test_phrase_added_and_removed() {
        let diff = LabelDiff::new(labels(&["cat", "dog"]), labels(&["bicycle"]));
        assert_eq!(diff.phrase(), "I now see cat, dog. I no longer see bicycle.");
    }

    #[test]
    fn test_phrase_preserves_insertion_order() {
        let diff = LabelDiff::new(labels(&["dog", "cat", "car"]), []);
        assert_eq!(diff.phrase(), "I now see dog, cat, car. ");
    }

    #[test]
    fn test_empty_diff() {
        let diff = LabelDiff::default();
        assert!(diff.is_empty());
    }
}
