//! Built-in maze fixtures.
//!
//! Each fixture owns its node roles, tube lengths and initial conductivities.
//! Fixtures with random conductivities draw them uniformly from
//! `[conductivity_min, conductivity_max]` of the solver configuration.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{PhysarumError, Result};
use crate::network::{Connection, Network, Node, NodeId};
use crate::solver::SolverConfig;

/// A named test maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maze {
    /// Six nodes, a short and a long branch between source and sink
    Simple,
    /// The 23-node maze from the Tero et al. paper
    TeroPaper,
    /// Three tubes meeting at one junction, one of them a dead end
    TShape,
    /// Two parallel tubes of different length between the same junctions
    Ring,
    /// Four nodes in a line
    Chain,
}

impl Maze {
    pub const ALL: [Maze; 5] = [
        Maze::Simple,
        Maze::TeroPaper,
        Maze::TShape,
        Maze::Ring,
        Maze::Chain,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Maze::Simple => "simple",
            Maze::TeroPaper => "tero",
            Maze::TShape => "t-shape",
            Maze::Ring => "ring",
            Maze::Chain => "chain",
        }
    }

    /// Build the maze with an RNG seeded from `seed`.
    pub fn build_seeded(&self, seed: u64, config: &SolverConfig) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build(&mut rng, config)
    }

    /// Build the maze, drawing random conductivities from `rng`.
    pub fn build<R: Rng>(&self, rng: &mut R, config: &SolverConfig) -> Result<Network> {
        config.validate()?;
        let (min, max) = (config.conductivity_min, config.conductivity_max);
        let mut random = move || rng.random_range(min..=max);

        match self {
            Maze::Simple => {
                let nodes = source_sink_and(0, 1, 2..6);
                let connections = vec![
                    tube(0, 2, 1.0, 0.8),
                    tube(2, 3, 3.0, 0.9),
                    tube(2, 4, 7.0, 0.5),
                    tube(3, 5, 3.0, 0.8),
                    tube(4, 5, 7.0, 0.6),
                    tube(5, 1, 1.0, 0.9),
                ];
                Network::new(nodes, connections)
            }
            Maze::TeroPaper => {
                let nodes = source_sink_and(0, 1, 2..23);
                let connections = TERO_TUBES
                    .iter()
                    .map(|&(a, b, length)| tube(a, b, length, random()))
                    .collect();
                Network::new(nodes, connections)
            }
            Maze::TShape => {
                let nodes = source_sink_and(1, 2, 3..5);
                let connections = vec![
                    tube(1, 3, 1.5, random()),
                    tube(3, 4, 1.5, random()),
                    tube(3, 2, 1.5, random()),
                ];
                Network::new(nodes, connections)
            }
            Maze::Ring => {
                let nodes = source_sink_and(1, 2, 3..5);
                let connections = vec![
                    tube(1, 3, 1.0, random()),
                    tube(4, 2, 1.0, random()),
                    tube(3, 4, 13.0, random()),
                    tube(3, 4, 42.0, random()),
                ];
                Network::new(nodes, connections)
            }
            Maze::Chain => {
                let nodes = source_sink_and(0, 1, 2..4);
                let connections = vec![
                    tube(0, 2, 1.0, 0.8),
                    tube(2, 3, 2.0, 0.8),
                    tube(3, 1, 1.0, 0.8),
                ];
                Network::new(nodes, connections)
            }
        }
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Maze {
    type Err = PhysarumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(Maze::Simple),
            "tero" | "tero-paper" => Ok(Maze::TeroPaper),
            "t-shape" | "tshape" | "t" => Ok(Maze::TShape),
            "ring" => Ok(Maze::Ring),
            "chain" => Ok(Maze::Chain),
            _ => Err(PhysarumError::UnknownMaze { name: s.to_string() }),
        }
    }
}

/// (start, end, length) of every tube in the Tero paper maze.
const TERO_TUBES: [(usize, usize, f64); 24] = [
    (0, 2, 1.5),
    (2, 3, 0.1),
    (2, 4, 4.0),
    (3, 4, 3.3),
    (3, 22, 1.6),
    (4, 5, 0.1),
    (5, 6, 0.1),
    (5, 7, 0.7),
    (7, 8, 5.0),
    (8, 9, 0.6),
    (8, 10, 0.1),
    (10, 11, 0.1),
    (10, 12, 0.2),
    (12, 13, 0.1),
    (12, 14, 1.0),
    (7, 19, 3.5),
    (6, 15, 1.1),
    (6, 16, 2.7),
    (16, 17, 0.2),
    (17, 18, 0.2),
    (17, 19, 0.2),
    (19, 20, 0.2),
    (16, 21, 0.7),
    (20, 1, 0.7),
];

fn source_sink_and(source: usize, sink: usize, rest: std::ops::Range<usize>) -> Vec<Node> {
    let mut nodes = vec![Node::source(source), Node::sink(sink)];
    nodes.extend(rest.map(Node::new));
    nodes
}

fn tube(start: usize, end: usize, length: f64, conductivity: f64) -> Connection {
    Connection::new(NodeId(start), NodeId(end), length, conductivity)
}
