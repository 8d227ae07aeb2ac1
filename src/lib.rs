//! treehouse: a checkbox tree state engine
//!
//! A forest of labelled nodes, each optionally checkable and expandable,
//! where checking and expanding propagate between parents and children
//! through named events.
//!
//! Layers, inner to outer:
//! - `domain`: the engine (nodes, forest, events), no I/O
//! - `application`: file-backed services and text rendering
//! - `infrastructure`: filesystem boundary
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    CheckOptions, Events, Interaction, Node, NodeDescription, NodeId, NodeKey, Tree, TreeOptions,
};
