//! Domain layer: the tree state engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod events;
pub mod node;
pub mod options;
pub mod schedule;
pub mod tree;

pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use events::{EventSubject, Events, ListenerError, ListenerResult, NodeEvent, Subject};
pub use node::{Node, NodeKey, NodeMut, PreOrder};
pub use options::TreeOptions;
pub use schedule::RESOLUTION_DELAY;
pub use tree::Tree;
