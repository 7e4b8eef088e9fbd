//! Core types for network representation.

use std::fmt;

/// A unique identifier for a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role a node plays in the flow system.
///
/// Sources inject the current `I0`, sinks extract it, normal nodes only
/// conserve flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NodeRole {
    Source,
    #[default]
    Normal,
    Sink,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Source => write!(f, "SOURCE"),
            NodeRole::Normal => write!(f, "NORMAL"),
            NodeRole::Sink => write!(f, "SINK"),
        }
    }
}
