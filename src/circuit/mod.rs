//! Circuit graph representation and validation.
//!
//! This module provides the index-based data model of a circuit: a
//! [`Graph`] per nesting level, the [`Project`] that owns the canvas and the
//! block palette, and the identifiers used to address components and
//! connectors without pointers.

mod graph;
mod project;
mod types;
mod validate;

pub use graph::{Graph, Line};
pub use project::Project;
pub use types::*;
pub use validate::{validate_block, validate_graph};
