//! Physarum - Slime Mold Network Solver
//!
//! Finds short routes through a network the way *Physarum polycephalum* does.
//!
//! # Usage
//!
//! ```bash
//! physarum network.phy --log-file run.log
//! physarum --maze tero --seed 7 --json --log-file trace.json
//! ```

use std::path::{Path, PathBuf};

use clap::{error::ErrorKind, CommandFactory, Parser};
use physarum_core::{
    dsl,
    error::{PhysarumError, Result},
    report,
    solver::SolveTrace,
    Maze, Network, PhysarumSolver, SolveReport, SolverConfig,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Slime mold adaptive-network solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the network description file
    #[arg(
        value_name = "NETWORK_FILE",
        required_unless_present = "maze",
        conflicts_with = "maze"
    )]
    network_file: Option<PathBuf>,

    /// Use a built-in maze instead of a file (simple, tero, t-shape, ring, chain)
    #[arg(short, long)]
    maze: Option<Maze>,

    /// Seed for random initial conductivities of built-in mazes
    #[arg(long)]
    seed: Option<u64>,

    /// Flux exponent
    #[arg(long)]
    mue: Option<f64>,

    /// Current injected at each source
    #[arg(long)]
    i0: Option<f64>,

    /// Maximum number of iterations
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Survival threshold for conductivities
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Convergence epsilon for conductivity changes
    #[arg(short, long)]
    epsilon: Option<f64>,

    /// Record a trace of the run and write it to this file
    #[arg(short, long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Write the trace as JSON instead of text
    #[arg(long, requires = "log_file")]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Where the network comes from.
enum Input<'a> {
    Maze(Maze),
    File(&'a Path),
}

impl Args {
    fn input(&self) -> Option<Input<'_>> {
        match (self.maze, self.network_file.as_deref()) {
            (Some(maze), _) => Some(Input::Maze(maze)),
            (None, Some(path)) => Some(Input::File(path)),
            (None, None) => None,
        }
    }

    /// Flags override `.param` directives, which override the defaults.
    fn apply(&self, mut config: SolverConfig) -> SolverConfig {
        if let Some(mue) = self.mue {
            config = config.with_mue(mue);
        }
        if let Some(i0) = self.i0 {
            config = config.with_i0(i0);
        }
        if let Some(iterations) = self.iterations {
            config = config.with_max_iterations(iterations);
        }
        if let Some(threshold) = self.threshold {
            config = config.with_survival_threshold(threshold);
        }
        if let Some(epsilon) = self.epsilon {
            config = config.with_convergence_epsilon(epsilon);
        }
        config.with_trace(self.log_file.is_some())
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    report: Option<&'a SolveReport>,
    trace: &'a SolveTrace,
}

fn build_solver(args: &Args, input: Input<'_>) -> Result<PhysarumSolver> {
    match input {
        Input::Maze(maze) => {
            let config = args.apply(SolverConfig::default());
            let seed = args.seed.unwrap_or_else(rand::random);
            info!(maze = %maze, seed, "Building maze");
            let network = maze.build_seeded(seed, &config)?;
            Ok(PhysarumSolver::with_config(network, config))
        }
        Input::File(path) => {
            let ast = dsl::parse_file(path)?;

            // Apply file parameters first so flags win
            let mut config = SolverConfig::default();
            config.apply_params(&ast.params)?;
            let config = args.apply(config);

            Ok(PhysarumSolver::with_config(Network::from_ast(&ast)?, config))
        }
    }
}

fn write_log(
    path: &Path,
    json: bool,
    solver: &PhysarumSolver,
    outcome: Option<&SolveReport>,
) -> Result<()> {
    let Some(trace) = solver.trace() else {
        return Ok(());
    };

    if !json {
        return report::write_report(path, trace);
    }

    let write_err = |source: std::io::Error| PhysarumError::FileWriteError {
        path: path.display().to_string(),
        source,
    };
    let output = JsonOutput {
        report: outcome,
        trace,
    };
    let text = serde_json::to_string_pretty(&output).map_err(|e| write_err(e.into()))?;
    std::fs::write(path, text).map_err(write_err)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing; RUST_LOG takes precedence
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(input) = args.input() else {
        Args::command()
            .error(ErrorKind::MissingRequiredArgument, "a network file or --maze is required")
            .exit()
    };

    let mut solver = build_solver(&args, input)?;
    let result = solver.solve();

    if let Some(path) = &args.log_file {
        write_log(path, args.json, &solver, result.as_ref().ok())?;
        info!(path = %path.display(), "Trace written");
    }

    let outcome = result?;

    println!(
        "{} after {} iterations; {} of {} connections survived:",
        if outcome.converged { "Converged" } else { "Stopped" },
        outcome.iterations,
        outcome.survived.len(),
        solver.connections().len()
    );
    for con in solver.survived_connections() {
        let label = con.name.clone().unwrap_or_else(|| con.description());
        println!(
            "  {}\t{} -> {}\tL = {}\tD = {:.5}\tQ = {:.5}",
            label,
            con.start(),
            con.end(),
            con.length(),
            con.conductivity(),
            con.flux()
        );
    }

    Ok(())
}
