//! Network graph representation and validation.
//!
//! This module provides the topology the solver works on. A [`Network`]
//! holds the [`Node`]s and [`Connection`]s of one run together with the
//! adjacency lookup used to assemble the flow system.

mod connection;
mod graph;
mod node;
mod types;
mod validate;

pub use connection::{Connection, FeedbackLaw, DEFAULT_ALPHA, DEFAULT_SATURATION, DEFAULT_WEIGHT};
pub use graph::Network;
pub use node::Node;
pub use types::*;
pub use validate::{topology_warnings, validate_lengths};
