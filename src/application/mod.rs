//! Application layer: services and presentation helpers
//!
//! This layer orchestrates the tree engine and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod render;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::PathContext;
