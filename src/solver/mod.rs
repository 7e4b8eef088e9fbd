//! Physarum adaptive-network solver.
//!
//! This module provides the numerical engine of the simulation.
//!
//! ## Iteration
//!
//! Each round assembles a flow-conservation system `A p = b` where:
//! - `p` contains the node pressures
//! - `A[j][i] = D_ij / L_ij` for every neighbour `i` of node `j`, and the
//!   diagonal holds the negated row sum
//! - `b` is `+I0` at sources, `-I0` at sinks and 0 elsewhere
//!
//! The system is solved in the least-squares sense, pressures are written
//! back to the nodes, and every connection then adapts:
//!
//! ```text
//! Q = D/L * (p_start - p_end)
//! D <- D + weight * (f(|Q|) - alpha * D)
//! ```
//!
//! The run stops once no conductivity moves by more than the convergence
//! epsilon, or when the iteration budget is spent.

mod config;
mod least_squares;
mod physarum;
mod system;
mod trace;

pub use config::SolverConfig;
pub use least_squares::solve_least_squares;
pub use physarum::{PhysarumSolver, SinkPinning, SolveReport};
pub use system::FlowSystem;
pub use trace::{
    ConnectionState, IterationSnapshot, NodeState, SolveTrace, TopologySnapshot, TraceOutcome,
};

/// Default flux exponent.
pub const DEFAULT_MUE: f64 = 1.2;

/// Default current injected per source.
pub const DEFAULT_I0: f64 = 1.0;

/// Default conductivity a connection must exceed to survive.
pub const DEFAULT_SURVIVAL_THRESHOLD: f64 = 0.001;

/// Default iteration budget per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Default per-connection stability bound.
pub const DEFAULT_CONVERGENCE_EPSILON: f64 = 0.00001;

/// Default lower bound for random initial conductivities.
pub const DEFAULT_CONDUCTIVITY_MIN: f64 = 0.5;

/// Default upper bound for random initial conductivities.
pub const DEFAULT_CONDUCTIVITY_MAX: f64 = 1.0;
