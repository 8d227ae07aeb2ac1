//! Domain entities: descriptions, identifiers and state values

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Caller-supplied node identifier.
///
/// Descriptions may use any JSON number or a string; both are kept as given
/// so that serialization returns exactly what was read. Numbers compare by
/// their JSON value kind, so `1` and `1.0` are different ids. Uniqueness is
/// not checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Number(n) => write!(f, "{}", n),
            NodeId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId::Text(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId::Text(value)
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        NodeId::Number(value.into())
    }
}

/// Serializable description of one node and its subtree.
///
/// Input of `Tree::build` and output of `Tree::to_serializable`.
/// Field presence on output:
/// - `id`/`checked` only for checkable nodes (those with an id)
/// - `nodes`/`expanded` only for nodes with children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<NodeDescription>>,
}

impl NodeDescription {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: label.into(),
            checked: None,
            expanded: None,
            nodes: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<NodeDescription>) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// Children in input order (empty when `nodes` is absent).
    pub fn children(&self) -> &[NodeDescription] {
        self.nodes.as_deref().unwrap_or_default()
    }

    /// Parse a forest (a JSON array of node descriptions).
    ///
    /// Malformed input rejects the whole forest; no partial trees.
    pub fn parse_forest(json: &str) -> DomainResult<Vec<NodeDescription>> {
        serde_json::from_str(json).map_err(|e| DomainError::InvalidDescription {
            message: e.to_string(),
        })
    }

    /// Render a forest as JSON.
    pub fn forest_to_json(forest: &[NodeDescription], pretty: bool) -> DomainResult<String> {
        let result = if pretty {
            serde_json::to_string_pretty(forest)
        } else {
            serde_json::to_string(forest)
        };
        result.map_err(|e| DomainError::InvalidDescription {
            message: e.to_string(),
        })
    }
}

/// Expand state of a node.
///
/// `Unresolved` is the state between construction and the deferred first
/// resolution; it is neither expanded nor collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expansion {
    #[default]
    Unresolved,
    Expanded,
    Collapsed,
}

impl Expansion {
    pub fn is_expanded(self) -> bool {
        self == Expansion::Expanded
    }
}

/// Modifiers for `check`/`uncheck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckOptions {
    /// Transition even if already in the target state.
    pub force: bool,
    /// Change state without emitting `update`/`check`/`uncheck`.
    pub silent: bool,
}

impl CheckOptions {
    pub const FORCED: CheckOptions = CheckOptions {
        force: true,
        silent: false,
    };

    pub const SILENT: CheckOptions = CheckOptions {
        force: false,
        silent: true,
    };
}

/// Whether an expand/collapse should be animated by the presentation side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Animation {
    #[default]
    Animated,
    Immediate,
}

/// Raw user-interaction signals delivered by a presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    ExpandClicked,
    CollapseClicked,
    LabelClicked,
    CheckboxChanged(bool),
    Hover,
}

/// Widths of the expand/collapse affordances, carried by `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderMetrics {
    pub expand_width: usize,
    pub collapse_width: usize,
}

impl RenderMetrics {
    /// Gutter needed to fit either affordance.
    pub fn gutter(&self) -> usize {
        self.expand_width.max(self.collapse_width)
    }
}
