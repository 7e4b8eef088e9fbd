//! The adaptive-network solver.

#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dsl::NetworkAst;
use crate::error::{PhysarumError, Result, SolveDiagnostics};
use crate::network::{topology_warnings, Connection, Network, Node, NodeId};

use super::least_squares::solve_least_squares;
use super::system::FlowSystem;
use super::trace::{IterationSnapshot, SolveTrace, TopologySnapshot, TraceOutcome};
use super::SolverConfig;

/// Whether the next matrix build grounds the sinks.
///
/// Before any flow exists the system has no reference pressure; the first
/// build after construction or [`PhysarumSolver::reset`] pins every sink to
/// zero and moves the state to `Applied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkPinning {
    Pending,
    Applied,
}

/// Summary of one `solve()` call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SolveReport {
    /// Iterations actually run
    pub iterations: usize,
    /// Whether every connection was stable in the last iteration
    pub converged: bool,
    /// Indices of connections above the survival threshold, insertion order
    pub survived: Vec<usize>,
}

/// Physarum solver over an owned [`Network`].
pub struct PhysarumSolver {
    network: Network,
    config: SolverConfig,
    system: FlowSystem,
    pinning: SinkPinning,
    topology: TopologySnapshot,
    trace: Option<SolveTrace>,
}

impl PhysarumSolver {
    /// Build a solver from node and connection collections with default
    /// configuration.
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>) -> Result<Self> {
        Ok(Self::from_network(Network::new(nodes, connections)?))
    }

    /// Create a solver for an already validated network.
    pub fn from_network(network: Network) -> Self {
        Self::with_config(network, SolverConfig::default())
    }

    /// Build a solver from a parsed description.
    ///
    /// `.param` directives in the description override values in `config`.
    pub fn from_ast(ast: &NetworkAst, mut config: SolverConfig) -> Result<Self> {
        config.apply_params(&ast.params)?;
        Ok(Self::with_config(Network::from_ast(ast)?, config))
    }

    /// Create a solver with custom configuration.
    pub fn with_config(network: Network, config: SolverConfig) -> Self {
        let topology = TopologySnapshot::capture(&network);
        let system = FlowSystem::new(network.node_count());
        let trace = config.trace.then(|| SolveTrace::new(topology.clone()));

        debug!(
            nodes = network.node_count(),
            connections = network.connection_count(),
            "Physarum solver created"
        );

        Self {
            network,
            config,
            system,
            pinning: SinkPinning::Pending,
            topology,
            trace,
        }
    }

    /// Run at most `max_iterations` rounds of pressure solve and
    /// conductivity update.
    ///
    /// A failed pressure solve aborts the run with
    /// [`PhysarumError::SolveFailed`]; the network keeps the state of the
    /// last completed iteration.
    pub fn solve(&mut self) -> Result<SolveReport> {
        self.config.validate()?;

        for warning in topology_warnings(&self.network) {
            warn!("{}", warning);
        }

        if self.config.trace && self.trace.is_none() {
            self.trace = Some(SolveTrace::new(self.topology.clone()));
        }

        let total = self.network.connection_count();
        let mut iterations = 0;
        let mut converged = false;

        for iteration in 0..self.config.max_iterations {
            let pin_sinks = self.pinning == SinkPinning::Pending;
            self.system.assemble(&self.network, self.config.i0, pin_sinks);
            self.pinning = SinkPinning::Applied;

            let pressures =
                match solve_least_squares(&self.system.lefthand, &self.system.righthand) {
                    Ok(p) => p,
                    Err(e) => return Err(self.abort(iteration, e)),
                };

            self.network.set_pressures(pressures.as_slice());
            self.network.update_connections(self.config.mue);

            for (index, con) in self.network.connections().iter().enumerate() {
                if con.became_non_finite() {
                    warn!(
                        iteration,
                        connection = index,
                        conductivity = con.conductivity(),
                        "Conductivity is no longer finite"
                    );
                }
            }

            let epsilon = self.config.convergence_epsilon;
            let unchanged = self
                .network
                .connections()
                .iter()
                .filter(|c| c.conductivity_change().abs() < epsilon)
                .count();

            debug!(iteration, unchanged, total, "Iteration complete");

            if self.config.trace {
                if let Some(trace) = self.trace.as_mut() {
                    trace.iterations.push(IterationSnapshot::capture(
                        iteration,
                        &self.system,
                        pressures.as_slice(),
                        &self.network,
                        unchanged,
                    ));
                }
            }

            iterations = iteration + 1;
            if unchanged >= total {
                converged = true;
                break;
            }
        }

        let survived = self.survived_indices();

        if converged {
            info!(iterations, survived = survived.len(), "Converged");
        } else {
            info!(iterations, survived = survived.len(), "Stopped at iteration limit");
        }

        self.record_outcome(if converged {
            TraceOutcome::Converged {
                iteration: iterations - 1,
            }
        } else {
            TraceOutcome::Exhausted { iterations }
        });

        Ok(SolveReport {
            iterations,
            converged,
            survived,
        })
    }

    fn abort(&mut self, iteration: usize, cause: PhysarumError) -> PhysarumError {
        let reason = cause.to_string();
        warn!(iteration, "Pressure solve failed: {}", reason);

        self.record_outcome(TraceOutcome::Failed {
            iteration,
            reason: reason.clone(),
            lefthand: self.system.lefthand_rows(),
            righthand: self.system.righthand.iter().copied().collect(),
        });

        PhysarumError::SolveFailed {
            reason,
            diagnostics: Box::new(SolveDiagnostics {
                iteration,
                lefthand: self.system.lefthand.clone(),
                righthand: self.system.righthand.clone(),
            }),
        }
    }

    fn record_outcome(&mut self, outcome: TraceOutcome) {
        if !self.config.trace {
            return;
        }
        if let Some(trace) = self.trace.as_mut() {
            trace.outcomes.push(outcome);
        }
    }

    /// Re-arm sink pinning and drop recorded trace iterations.
    ///
    /// Conductivities are left as they are, so a reset solver continues
    /// from the current network state.
    pub fn reset(&mut self) {
        self.pinning = SinkPinning::Pending;
        if let Some(trace) = self.trace.as_mut() {
            trace.clear();
        }
    }

    /// Connections whose conductivity is above the survival threshold.
    pub fn survived_connections(&self) -> Vec<&Connection> {
        self.network
            .connections()
            .iter()
            .filter(|c| c.conductivity() > self.config.survival_threshold)
            .collect()
    }

    /// Indices of surviving connections.
    pub fn survived_indices(&self) -> Vec<usize> {
        self.network
            .connections()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.conductivity() > self.config.survival_threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// DL-fraction of the connection between two nodes, queried in either order.
    pub fn dl_fraction_between(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.network.dl_fraction_between(a, b)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn nodes(&self) -> &[Node] {
        self.network.nodes()
    }

    pub fn connections(&self) -> &[Connection] {
        self.network.connections()
    }

    /// Mutable node access, e.g. to change a role between runs.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.network.node_mut(id)
    }

    /// Mutable connection access, e.g. to change the feedback law between runs.
    pub fn connection_mut(&mut self, index: usize) -> Option<&mut Connection> {
        self.network.connection_mut(index)
    }

    /// Topology captured at construction.
    pub fn topology(&self) -> &TopologySnapshot {
        &self.topology
    }

    /// Recorded trace, if tracing was ever enabled.
    pub fn trace(&self) -> Option<&SolveTrace> {
        self.trace.as_ref()
    }

    /// Take the recorded trace out of the solver.
    pub fn take_trace(&mut self) -> Option<SolveTrace> {
        self.trace.take()
    }

    pub fn sink_pinning(&self) -> SinkPinning {
        self.pinning
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
    }

    pub fn mue(&self) -> f64 {
        self.config.mue
    }

    pub fn set_mue(&mut self, mue: f64) {
        self.config.mue = mue;
    }

    pub fn i0(&self) -> f64 {
        self.config.i0
    }

    pub fn set_i0(&mut self, i0: f64) {
        self.config.i0 = i0;
    }

    pub fn survival_threshold(&self) -> f64 {
        self.config.survival_threshold
    }

    pub fn set_survival_threshold(&mut self, threshold: f64) {
        self.config.survival_threshold = threshold;
    }

    pub fn max_iterations(&self) -> usize {
        self.config.max_iterations
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.config.max_iterations = max_iterations;
    }

    pub fn convergence_epsilon(&self) -> f64 {
        self.config.convergence_epsilon
    }

    pub fn set_convergence_epsilon(&mut self, epsilon: f64) {
        self.config.convergence_epsilon = epsilon;
    }

    pub fn conductivity_min(&self) -> f64 {
        self.config.conductivity_min
    }

    pub fn set_conductivity_min(&mut self, min: f64) {
        self.config.conductivity_min = min;
    }

    pub fn conductivity_max(&self) -> f64 {
        self.config.conductivity_max
    }

    pub fn set_conductivity_max(&mut self, max: f64) {
        self.config.conductivity_max = max;
    }

    pub fn trace_enabled(&self) -> bool {
        self.config.trace
    }

    /// Turn trace recording on or off. Already recorded data is kept.
    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.config.trace = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::FeedbackLaw;
    use approx::assert_relative_eq;

    fn chain() -> PhysarumSolver {
        let nodes = vec![Node::source(0), Node::sink(1), Node::new(2), Node::new(3)];
        let connections = vec![
            Connection::new(NodeId(0), NodeId(2), 1.0, 0.8),
            Connection::new(NodeId(2), NodeId(3), 2.0, 0.8),
            Connection::new(NodeId(3), NodeId(1), 1.0, 0.8),
        ];
        PhysarumSolver::new(nodes, connections).unwrap()
    }

    fn single_edge(conductivity: f64) -> PhysarumSolver {
        let nodes = vec![Node::source(0), Node::sink(1)];
        let connections = vec![Connection::new(NodeId(0), NodeId(1), 1.0, conductivity)];
        PhysarumSolver::new(nodes, connections).unwrap()
    }

    #[test]
    fn test_chain_all_edges_survive() {
        let mut solver = chain();
        let report = solver.solve().unwrap();

        assert!(report.converged);
        assert_eq!(report.iterations, 2);
        assert_eq!(report.survived, vec![0, 1, 2]);
        for con in solver.connections() {
            assert_relative_eq!(con.conductivity(), 1.0, epsilon = 1e-9);
            assert_relative_eq!(con.flux().abs(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_first_iteration_grounds_sink() {
        let mut solver = chain();
        solver.set_max_iterations(1);
        solver.solve().unwrap();

        let pressures: Vec<f64> = solver.nodes().iter().map(|n| n.pressure()).collect();
        assert_relative_eq!(pressures[0], -5.0, epsilon = 1e-9);
        assert_relative_eq!(pressures[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(pressures[2], -3.75, epsilon = 1e-9);
        assert_relative_eq!(pressures[3], -1.25, epsilon = 1e-9);
    }

    #[test]
    fn test_single_edge_converges() {
        let mut solver = single_edge(0.5);
        let report = solver.solve().unwrap();

        assert!(report.converged);
        assert!(report.iterations <= 3);
        assert_eq!(report.survived, vec![0]);
        assert_relative_eq!(solver.connections()[0].conductivity(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_second_solve_converges_immediately() {
        let mut solver = chain();
        solver.solve().unwrap();

        let report = solver.solve().unwrap();
        assert!(report.converged);
        assert_eq!(report.iterations, 1);
    }

    #[test]
    fn test_pinning_state() {
        let mut solver = chain();
        assert_eq!(solver.sink_pinning(), SinkPinning::Pending);
        solver.solve().unwrap();
        assert_eq!(solver.sink_pinning(), SinkPinning::Applied);
        solver.reset();
        assert_eq!(solver.sink_pinning(), SinkPinning::Pending);
    }

    #[test]
    fn test_type_three_law() {
        // |Q| = 1 gives f = 1/2, which is already the equilibrium for D = 0.5
        let nodes = vec![Node::source(0), Node::sink(1)];
        let connections = vec![
            Connection::new(NodeId(0), NodeId(1), 1.0, 0.5).with_law(FeedbackLaw::TypeThree),
        ];
        let mut solver = PhysarumSolver::new(nodes, connections).unwrap();
        let report = solver.solve().unwrap();

        assert!(report.converged);
        assert_relative_eq!(solver.connections()[0].conductivity(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_type_two_law() {
        // Unit flux gives f = 1 for any k, so D settles at 1 / alpha
        let nodes = vec![Node::source(0), Node::sink(1)];
        let connections = vec![Connection::new(NodeId(0), NodeId(1), 1.0, 0.5)
            .with_law(FeedbackLaw::TypeTwo)
            .with_saturation(4.0)
            .with_alpha(0.5)];
        let mut solver = PhysarumSolver::new(nodes, connections).unwrap();
        let report = solver.solve().unwrap();

        assert!(report.converged);
        assert_relative_eq!(solver.connections()[0].flux().abs(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(solver.connections()[0].conductivity(), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_nan_conductivity_aborts_with_diagnostics() {
        let mut solver = single_edge(f64::NAN);
        let err = solver.solve().unwrap_err();

        assert!(!err.is_configuration_error());
        let diagnostics = err.diagnostics().unwrap();
        assert_eq!(diagnostics.iteration, 0);
        assert_eq!(diagnostics.lefthand.nrows(), 2);
        assert_eq!(diagnostics.righthand.as_slice(), &[1.0, -1.0]);
    }

    #[test]
    fn test_zero_iterations() {
        let mut solver = chain();
        solver.set_max_iterations(0);
        let report = solver.solve().unwrap();
        assert_eq!(report.iterations, 0);
        assert!(!report.converged);
        // Untouched conductivities are all above the threshold
        assert_eq!(report.survived.len(), 3);
    }

    #[test]
    fn test_threshold_filters_survivors() {
        let mut solver = chain();
        solver.set_survival_threshold(2.0);
        let report = solver.solve().unwrap();
        assert!(report.survived.is_empty());
        assert!(solver.survived_connections().is_empty());
    }

    #[test]
    fn test_trace_records_iterations() {
        let mut solver = chain();
        assert!(solver.trace().is_none());

        solver.set_trace_enabled(true);
        let report = solver.solve().unwrap();

        let trace = solver.trace().unwrap();
        assert_eq!(trace.topology.nodes.len(), 4);
        assert_eq!(trace.iterations.len(), report.iterations);
        assert_eq!(trace.iterations[0].lefthand.len(), 4);
        assert_eq!(trace.iterations[0].pressures.len(), 4);
        assert_eq!(
            trace.last_outcome(),
            Some(&TraceOutcome::Converged { iteration: 1 })
        );
    }

    #[test]
    fn test_trace_does_not_change_results() {
        let mut plain = chain();
        let mut traced = chain();
        traced.set_trace_enabled(true);

        assert_eq!(plain.solve().unwrap(), traced.solve().unwrap());
        for (a, b) in plain.connections().iter().zip(traced.connections()) {
            assert_eq!(a.conductivity(), b.conductivity());
        }
    }

    #[test]
    fn test_trace_records_failure() {
        let mut solver = single_edge(f64::NAN);
        solver.set_trace_enabled(true);
        assert!(solver.solve().is_err());

        match solver.trace().unwrap().last_outcome() {
            Some(TraceOutcome::Failed { iteration, righthand, .. }) => {
                assert_eq!(*iteration, 0);
                assert_eq!(righthand, &vec![1.0, -1.0]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_take_trace() {
        let mut solver = chain();
        solver.set_trace_enabled(true);
        solver.solve().unwrap();

        let trace = solver.take_trace().unwrap();
        assert_eq!(trace.iterations.len(), 2);
        assert!(solver.trace().is_none());

        // Still enabled, so the next run starts a fresh trace
        solver.solve().unwrap();
        assert_eq!(solver.trace().unwrap().iterations.len(), 1);
    }

    #[test]
    fn test_set_config() {
        let mut solver = chain();
        solver.set_config(SolverConfig::default().with_max_iterations(1).with_i0(2.0));
        assert_eq!(solver.i0(), 2.0);

        let report = solver.solve().unwrap();
        assert_eq!(report.iterations, 1);
        assert_relative_eq!(solver.nodes()[0].pressure(), -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut solver = chain();
        solver.set_mue(f64::NAN);
        assert!(matches!(
            solver.solve(),
            Err(PhysarumError::InvalidSolverParam { .. })
        ));
    }

    #[test]
    fn test_lookup_through_solver() {
        let solver = chain();
        assert_eq!(
            solver.dl_fraction_between(NodeId(2), NodeId(3)),
            solver.dl_fraction_between(NodeId(3), NodeId(2))
        );
        assert_eq!(solver.dl_fraction_between(NodeId(0), NodeId(1)), None);
    }

    #[test]
    fn test_from_ast_applies_params() {
        let description = ".source s\n.sink t\n.param mue=1.5 iterations=5\nE1 s t 1 0.5";
        let ast = crate::dsl::parse(description).unwrap();
        let solver = PhysarumSolver::from_ast(&ast, SolverConfig::default().with_i0(2.0)).unwrap();
        assert_eq!(solver.mue(), 1.5);
        assert_eq!(solver.max_iterations(), 5);
        assert_eq!(solver.i0(), 2.0);
        assert!(solver.nodes()[0].is_source());
    }

    #[test]
    fn test_solver_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<PhysarumSolver>();
    }
}
