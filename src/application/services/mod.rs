//! Application services
//!
//! Concrete services that drive the tree engine. They depend on I/O boundary
//! traits (FileSystem) but are themselves concrete structs, not traits.

mod forest;

pub use forest::{EventRecord, ForestService, Operation, Outcome};
