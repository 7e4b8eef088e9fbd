//! Structured per-iteration trace of a solver run.
//!
//! Recording is opt-in (see [`SolverConfig::with_trace`](super::SolverConfig::with_trace))
//! and read-only with respect to the numerics: snapshots copy state after it
//! has been computed. Rendering is left to [`crate::report`].

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::network::{Connection, Network, Node, NodeId, NodeRole};

use super::system::FlowSystem;

/// State of one node at snapshot time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NodeState {
    pub id: NodeId,
    pub name: String,
    pub role: NodeRole,
    pub pressure: f64,
}

impl From<&Node> for NodeState {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id(),
            name: node.name(),
            role: node.role(),
            pressure: node.pressure(),
        }
    }
}

/// State of one connection at snapshot time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ConnectionState {
    pub start: NodeId,
    pub end: NodeId,
    pub length: f64,
    pub conductivity: f64,
    pub flux: f64,
    pub conductivity_change: f64,
}

impl From<&Connection> for ConnectionState {
    fn from(con: &Connection) -> Self {
        Self {
            start: con.start(),
            end: con.end(),
            length: con.length(),
            conductivity: con.conductivity(),
            flux: con.flux(),
            conductivity_change: con.conductivity_change(),
        }
    }
}

/// Topology as handed to the solver, captured at construction.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TopologySnapshot {
    pub nodes: Vec<NodeState>,
    pub connections: Vec<ConnectionState>,
}

impl TopologySnapshot {
    pub fn capture(network: &Network) -> Self {
        Self {
            nodes: network.nodes().iter().map(NodeState::from).collect(),
            connections: network.connections().iter().map(ConnectionState::from).collect(),
        }
    }
}

/// Everything computed in one iteration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct IterationSnapshot {
    /// Zero-based iteration number
    pub iteration: usize,
    /// Lefthand side, row by row
    pub lefthand: Vec<Vec<f64>>,
    /// Righthand side
    pub righthand: Vec<f64>,
    /// Solved pressures, by node position
    pub pressures: Vec<f64>,
    /// Connections after the flux/conductivity update
    pub connections: Vec<ConnectionState>,
    /// Connections whose conductivity change was below epsilon
    pub unchanged: usize,
}

impl IterationSnapshot {
    pub(crate) fn capture(
        iteration: usize,
        system: &FlowSystem,
        pressures: &[f64],
        network: &Network,
        unchanged: usize,
    ) -> Self {
        Self {
            iteration,
            lefthand: system.lefthand_rows(),
            righthand: system.righthand.iter().copied().collect(),
            pressures: pressures.to_vec(),
            connections: network.connections().iter().map(ConnectionState::from).collect(),
            unchanged,
        }
    }
}

/// How a traced run ended.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TraceOutcome {
    /// Every connection was stable in this iteration
    Converged { iteration: usize },
    /// The iteration budget ran out
    Exhausted { iterations: usize },
    /// The pressure solve failed; the system it was given is attached
    Failed {
        iteration: usize,
        reason: String,
        lefthand: Vec<Vec<f64>>,
        righthand: Vec<f64>,
    },
}

/// Recorded history of one solver.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SolveTrace {
    /// Topology at construction time
    pub topology: TopologySnapshot,
    /// One entry per completed iteration, across all `solve()` calls
    pub iterations: Vec<IterationSnapshot>,
    /// Outcome of each `solve()` call, in order
    pub outcomes: Vec<TraceOutcome>,
}

impl SolveTrace {
    pub fn new(topology: TopologySnapshot) -> Self {
        Self {
            topology,
            iterations: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    /// Outcome of the most recent run.
    pub fn last_outcome(&self) -> Option<&TraceOutcome> {
        self.outcomes.last()
    }

    /// Drop recorded iterations and outcomes, keeping the topology.
    pub fn clear(&mut self) {
        self.iterations.clear();
        self.outcomes.clear();
    }
}
