//! Resolved tree behaviour switches

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration shared read-only by every node of a forest.
///
/// Presentation-only fields (`indent_length`, icons, `animation_time`,
/// `click_to_*`) are carried for the rendering side; the engine itself only
/// consults `expanded`, the propagation switches and the click switches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeOptions {
    /// Indent per depth level
    pub indent_length: u32,
    pub expand_icon: String,
    pub collapse_icon: String,
    /// Expand/collapse animation duration in milliseconds
    pub animation_time: u64,
    /// Default expand state for nodes that do not specify one
    pub expanded: bool,
    pub child_updates_parent: bool,
    pub parent_selects_children: bool,
    pub checked_parent_must_have_checked_children: bool,
    pub click_to_expand: bool,
    pub click_to_check: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            indent_length: 30,
            expand_icon: "+".into(),
            collapse_icon: "-".into(),
            animation_time: 300,
            expanded: true,
            child_updates_parent: true,
            parent_selects_children: true,
            checked_parent_must_have_checked_children: true,
            click_to_expand: true,
            click_to_check: true,
        }
    }
}

impl TreeOptions {
    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_time)
    }

    /// Options with every propagation rule switched off.
    pub fn independent() -> Self {
        Self {
            child_updates_parent: false,
            parent_selects_children: false,
            checked_parent_must_have_checked_children: false,
            ..Self::default()
        }
    }
}
