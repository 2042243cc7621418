//! Per-stage item counting rules.
//!
//! A stage's output payload is opaque to the engine, but the visualization
//! layer wants to show "5 stories" or "12 files" next to a node. Each stage
//! declares how its payload is counted; there is no universal formula.

use serde::{Deserialize, Serialize};

/// How the discrete artifacts inside a stage's output payload are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCountRule {
    /// The payload is a single artifact; counts as 0.
    Single,
    /// The payload is a JSON array of artifacts (e.g. user stories).
    ArrayLength,
    /// The payload is a JSON object keyed by artifact name (e.g. generated
    /// files keyed by filename).
    ObjectKeys,
}

impl Default for ItemCountRule {
    fn default() -> Self {
        Self::Single
    }
}

impl ItemCountRule {
    /// Counts the artifacts in a payload according to this rule.
    ///
    /// A payload whose shape does not match the rule counts as 0 rather
    /// than failing the stage; counting is advisory, not validating.
    #[must_use]
    pub fn count(&self, payload: &serde_json::Value) -> u64 {
        match self {
            Self::Single => 0,
            Self::ArrayLength => payload.as_array().map_or(0, |a| a.len() as u64),
            Self::ObjectKeys => payload.as_object().map_or(0, |o| o.len() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_counts_zero() {
        assert_eq!(ItemCountRule::Single.count(&json!({"a": 1, "b": 2})), 0);
        assert_eq!(ItemCountRule::Single.count(&json!([1, 2, 3])), 0);
    }

    #[test]
    fn test_array_length() {
        assert_eq!(ItemCountRule::ArrayLength.count(&json!([1, 2, 3])), 3);
        assert_eq!(ItemCountRule::ArrayLength.count(&json!([])), 0);
    }

    #[test]
    fn test_object_keys() {
        let payload = json!({"main.py": "...", "models.py": "..."});
        assert_eq!(ItemCountRule::ObjectKeys.count(&payload), 2);
    }

    #[test]
    fn test_shape_mismatch_counts_zero() {
        assert_eq!(ItemCountRule::ArrayLength.count(&json!({"k": 1})), 0);
        assert_eq!(ItemCountRule::ObjectKeys.count(&json!([1, 2])), 0);
        assert_eq!(ItemCountRule::ObjectKeys.count(&json!("text")), 0);
    }

    #[test]
    fn test_rule_serialize() {
        let json = serde_json::to_string(&ItemCountRule::ObjectKeys).unwrap();
        assert_eq!(json, r#""object_keys""#);

        let back: ItemCountRule = serde_json::from_str(r#""array_length""#).unwrap();
        assert_eq!(back, ItemCountRule::ArrayLength);
    }
}
