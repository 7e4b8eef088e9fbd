//! # Physarum Core
//!
//! An adaptive-network solver modelled on the slime mold *Physarum polycephalum*.
//!
//! This library provides:
//! - A network model of nodes (sources, sinks, junctions) joined by tubes
//! - The Tero–Kobayashi–Nakagaki flux feedback iteration with three growth laws
//! - A small text format for describing networks
//! - Built-in test mazes and a plain-text report of a traced run
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`network`] - Nodes, connections and the validated network graph
//! - [`dsl`] - Parser for the network description language
//! - [`solver`] - Flow-system assembly, least-squares solve and the iteration
//! - [`mazes`] - Fixture networks
//! - [`report`] - Text rendering of a solve trace
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! physarum network.phy --log-file run.log
//! physarum --maze tero --seed 7
//! ```
//!
//! ### Library
//!
//! ```
//! use physarum_core::{Connection, Node, NodeId, PhysarumSolver};
//!
//! let nodes = vec![Node::source(0), Node::sink(1), Node::new(2)];
//! let connections = vec![
//!     Connection::new(NodeId(0), NodeId(2), 1.0, 0.8),
//!     Connection::new(NodeId(2), NodeId(1), 1.0, 0.8),
//! ];
//!
//! let mut solver = PhysarumSolver::new(nodes, connections).unwrap();
//! let report = solver.solve().unwrap();
//! assert!(report.converged);
//! assert_eq!(solver.survived_connections().len(), 2);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmPhysarum } from 'physarum_core';
//!
//! const sim = new WasmPhysarum(description);
//! sim.solve();
//! console.log(sim.survived());
//! ```
//!
//! ## Model
//!
//! Each iteration:
//!
//! 1. Assemble the flow-conservation system from the current D/L of every tube
//! 2. Solve it in the least-squares sense for the node pressures
//! 3. Derive each tube's flux from the pressure drop and adapt its conductivity
//!
//! Tubes carrying little flux decay; the network shrinks towards the short
//! routes between sources and sinks.

pub mod dsl;
pub mod error;
pub mod mazes;
pub mod network;
pub mod report;
pub mod solver;

// Re-export main types for convenience
pub use error::{PhysarumError, Result};
pub use mazes::Maze;
pub use network::{Connection, FeedbackLaw, Network, Node, NodeId, NodeRole};
pub use solver::{PhysarumSolver, SolveReport, SolverConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmPhysarum;
