//! Domain-level errors (no I/O, no config)

use thiserror::Error;

use crate::domain::entities::NodeId;
use crate::domain::events::ListenerError;
use crate::domain::node::NodeKey;

/// Domain errors represent violations of the tree engine's contract.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    #[error("no node with id: {0}")]
    UnknownId(NodeId),

    #[error("invalid tree description: {message}")]
    InvalidDescription { message: String },

    #[error("listener for '{event}' failed: {source}")]
    Listener {
        event: String,
        #[source]
        source: ListenerError,
    },
}

/// Result type for tree engine operations.
pub type DomainResult<T> = Result<T, DomainError>;
