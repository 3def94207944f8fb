//! Preview policy for paid content.

use serde::{Deserialize, Serialize};

/// How much of a piece of content is visible without access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreviewPolicy {
    /// Nothing is visible without access.
    None,

    /// The first `units` lesson units are visible without access.
    FirstUnits { units: u32 },
}

impl PreviewPolicy {
    /// Returns the number of units visible without access, if any.
    pub fn visible_units(&self) -> Option<u32> {
        match self {
            PreviewPolicy::None => None,
            PreviewPolicy::FirstUnits { units } if *units > 0 => Some(*units),
            // FirstUnits(0) degenerates to no preview
            PreviewPolicy::FirstUnits { .. } => None,
        }
    }
}

impl Default for PreviewPolicy {
    fn default() -> Self {
        PreviewPolicy::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_has_no_visible_units() {
        assert_eq!(PreviewPolicy::None.visible_units(), None);
    }

    #[test]
    fn first_units_exposes_count() {
        assert_eq!(
            PreviewPolicy::FirstUnits { units: 3 }.visible_units(),
            Some(3)
        );
    }

    #[test]
    fn zero_units_means_no_preview() {
        assert_eq!(PreviewPolicy::FirstUnits { units: 0 }.visible_units(), None);
    }

    #[test]
    fn policy_serializes_with_type_tag() {
        let json = serde_json::to_string(&PreviewPolicy::FirstUnits { units: 2 }).unwrap();
        assert!(json.contains("\"type\":\"first_units\""));
    }
}
