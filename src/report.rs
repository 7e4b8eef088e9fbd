//! Plain-text rendering of a [`SolveTrace`].
//!
//! The layout lists the starting topology, then for every iteration the
//! assembled equations (`eqN = [...]`), the solved pressures (`pN = [...]`)
//! and a flux/conductivity table, followed by how the run ended.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{PhysarumError, Result};
use crate::solver::{ConnectionState, IterationSnapshot, NodeState, SolveTrace, TraceOutcome};

const FRAME: &str = "<======================================================================>";
const RULE: &str = "---------------------------------------------------";
const ALARM: &str = "<><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><>";

/// Render the whole trace.
pub fn render(trace: &SolveTrace) -> String {
    let mut out = String::new();

    render_nodes(&mut out, &trace.topology.nodes);
    render_connections(&mut out, &trace.topology.connections);

    let mut pending = trace.iterations.iter();
    for outcome in &trace.outcomes {
        let count = match outcome {
            TraceOutcome::Converged { iteration } => iteration + 1,
            TraceOutcome::Exhausted { iterations } => *iterations,
            TraceOutcome::Failed { iteration, .. } => *iteration,
        };
        for snapshot in pending.by_ref().take(count) {
            render_iteration(&mut out, snapshot);
        }
        render_outcome(&mut out, outcome);
    }

    // Iterations of a run that has not reported an outcome yet
    for snapshot in pending {
        render_iteration(&mut out, snapshot);
    }

    out
}

/// Render the trace into a file.
pub fn write_report(path: &Path, trace: &SolveTrace) -> Result<()> {
    std::fs::write(path, render(trace)).map_err(|e| PhysarumError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

fn render_nodes(out: &mut String, nodes: &[NodeState]) {
    let _ = writeln!(out, "{}", FRAME);
    let _ = writeln!(out, "Nodes:");
    for node in nodes {
        let _ = writeln!(
            out,
            "Node: id = {}\tpressure = {}\t{}",
            node.id, node.pressure, node.role
        );
    }
    let _ = writeln!(out, "{}", FRAME);
}

fn render_connections(out: &mut String, connections: &[ConnectionState]) {
    let _ = writeln!(out, "{}", FRAME);
    let _ = writeln!(out, "Connections:");
    for con in connections {
        let _ = writeln!(
            out,
            "Connection from {} to {}\tQ = {}\tL = {}\tD = {}",
            con.start, con.end, con.flux, con.length, con.conductivity
        );
    }
    let _ = writeln!(out, "{}", FRAME);
}

fn render_rows(out: &mut String, prefix: &str, rows: &[Vec<f64>]) {
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(out, "{}{} = {:?}", prefix, i, row);
    }
}

fn render_column(out: &mut String, prefix: &str, values: &[f64]) {
    for (i, value) in values.iter().enumerate() {
        let _ = writeln!(out, "{}{} = [{:?}]", prefix, i, value);
    }
}

fn render_iteration(out: &mut String, snapshot: &IterationSnapshot) {
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "          iteration {}", snapshot.iteration);
    let _ = writeln!(out, "{}", RULE);

    render_rows(out, "eq", &snapshot.lefthand);
    out.push('\n');
    render_column(out, "eq", &snapshot.righthand);
    out.push('\n');
    render_column(out, "p", &snapshot.pressures);
    out.push('\n');

    for con in &snapshot.connections {
        let _ = writeln!(
            out,
            "Connection from {} to {}, Q = {:.5}\tD = {:.5}\tdeltaD = {:.5}\tL = {}",
            con.start, con.end, con.flux, con.conductivity, con.conductivity_change, con.length
        );
    }
    let _ = writeln!(out, "{}", RULE);
}

fn render_outcome(out: &mut String, outcome: &TraceOutcome) {
    match outcome {
        TraceOutcome::Converged { iteration } => {
            let _ = writeln!(out, "PhysarumSolver stopped at iteration {}", iteration);
        }
        TraceOutcome::Exhausted { iterations } => {
            let _ = writeln!(out, "PhysarumSolver reached the limit of {} iterations", iterations);
        }
        TraceOutcome::Failed {
            iteration,
            reason,
            lefthand,
            righthand,
        } => {
            let _ = writeln!(out, "{}", ALARM);
            let _ = writeln!(out, "iteration {}: {}", iteration, reason);
            render_rows(out, "eq", lefthand);
            out.push('\n');
            render_column(out, "eq", righthand);
            out.push('\n');
            let _ = writeln!(out, "{}", ALARM);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Connection, Node, NodeId};
    use crate::solver::PhysarumSolver;

    fn traced_single_edge(conductivity: f64) -> PhysarumSolver {
        let nodes = vec![Node::source(0), Node::sink(1)];
        let connections = vec![Connection::new(NodeId(0), NodeId(1), 1.0, conductivity)];
        let mut solver = PhysarumSolver::new(nodes, connections).unwrap();
        solver.set_trace_enabled(true);
        solver
    }

    #[test]
    fn test_render_converged_run() {
        let mut solver = traced_single_edge(0.5);
        solver.solve().unwrap();
        let text = render(solver.trace().unwrap());

        assert!(text.contains("Nodes:\nNode: id = 0\tpressure = 0\tSOURCE\n"));
        assert!(text.contains("Connection from 0 to 1\tQ = 0\tL = 1\tD = 0.5\n"));
        assert!(text.contains("          iteration 0\n"));
        assert!(text.contains("          iteration 1\n"));
        assert!(text.contains("eq0 = [-0.5, 0.0]\n"));
        assert!(text.contains("eq1 = [-1.0]\n"));
        assert!(text.contains("p0 = ["));
        assert!(text.contains(
            "Connection from 0 to 1, Q = -1.00000\tD = 1.00000\tdeltaD = 0.50000\tL = 1\n"
        ));
        assert!(text.ends_with("PhysarumSolver stopped at iteration 1\n"));
    }

    #[test]
    fn test_render_exhausted_run() {
        let mut solver = traced_single_edge(0.5);
        solver.set_max_iterations(1);
        solver.solve().unwrap();
        let text = render(solver.trace().unwrap());
        assert!(text.ends_with("PhysarumSolver reached the limit of 1 iterations\n"));
    }

    #[test]
    fn test_render_failure() {
        let mut solver = traced_single_edge(f64::NAN);
        assert!(solver.solve().is_err());
        let text = render(solver.trace().unwrap());

        assert!(!text.contains("iteration 0\n---"));
        assert!(text.contains(ALARM));
        assert!(text.contains("iteration 0: "));
        assert!(text.contains("eq0 = [1.0]\n"));
    }
}
