//! Overlay mitigation for intercepted interactions
//!
//! The applications this engine drives routinely float modals, cookie
//! banners and backdrops over the element under test. When an interaction
//! is intercepted, the runner queries a configured list of known overlay
//! candidates and clicks them closed before retrying the original action.

use pagevet_core_types::{SelectorCandidate, TargetCondition};
use serde::{Deserialize, Serialize};

/// Policy for dismissing known blocking overlays
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MitigationPolicy {
    /// Maximum dismiss-and-retry passes per action attempt
    pub max_passes: u32,

    /// Candidates for overlays worth dismissing, tried in order
    pub overlays: Vec<SelectorCandidate>,
}

impl MitigationPolicy {
    pub fn new(max_passes: u32, overlays: Vec<SelectorCandidate>) -> Self {
        Self {
            max_passes,
            overlays,
        }
    }

    /// Policy with no overlay knowledge; blocked interactions fail fast
    pub fn disabled() -> Self {
        Self {
            max_passes: 0,
            overlays: Vec::new(),
        }
    }
}

impl Default for MitigationPolicy {
    fn default() -> Self {
        Self {
            max_passes: 2,
            overlays: vec![
                SelectorCandidate::css(".modal-backdrop", TargetCondition::Visible),
                SelectorCandidate::css("[data-dismiss]", TargetCondition::Clickable),
                SelectorCandidate::css(".cookie-banner button", TargetCondition::Clickable),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_has_bounded_passes() {
        let policy = MitigationPolicy::default();
        assert_eq!(policy.max_passes, 2);
        assert!(!policy.overlays.is_empty());
    }

    #[test]
    fn test_disabled_policy() {
        let policy = MitigationPolicy::disabled();
        assert_eq!(policy.max_passes, 0);
        assert!(policy.overlays.is_empty());
    }
}
