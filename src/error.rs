//! Error types for the Physarum network solver.
//!
//! This module provides a unified error type [`PhysarumError`] that covers
//! all error conditions that can occur while parsing a network description,
//! validating a topology, and running the solver.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::network::NodeId;

/// Result type alias using [`PhysarumError`].
pub type Result<T> = std::result::Result<T, PhysarumError>;

/// Linear system that was being solved when a run aborted.
///
/// Attached to [`PhysarumError::SolveFailed`] for post-mortem inspection.
#[derive(Debug, Clone)]
pub struct SolveDiagnostics {
    /// Zero-based iteration in which the solve failed
    pub iteration: usize,
    /// Lefthand side (flow-conservation coefficients)
    pub lefthand: DMatrix<f64>,
    /// Righthand side (injected/extracted current per node)
    pub righthand: DVector<f64>,
}

/// Unified error type for all Physarum operations.
#[derive(Error, Debug)]
pub enum PhysarumError {
    // ============ Description Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid connection definition
    #[error("Invalid connection '{name}' at line {line}: {message}")]
    InvalidConnection {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown solver parameter in a `.param` directive
    #[error("Unknown parameter '{param}' at line {line}")]
    UnknownParameter { param: String, line: usize },

    /// Unknown maze fixture name
    #[error("Unknown maze '{name}' (expected one of: simple, tero, t-shape, ring, chain)")]
    UnknownMaze { name: String },

    // ============ Network Validation Errors ============
    /// A connection references a node that is not part of the network
    #[error("Connection {connection} references node {node} which is not in the node collection")]
    NodeNotFound { connection: usize, node: NodeId },

    /// Two nodes share the same id
    #[error("Duplicate node id {id}")]
    DuplicateNode { id: NodeId },

    /// Connection length must be strictly positive
    #[error("Connection {connection} has non-positive length {length}")]
    InvalidLength { connection: usize, length: f64 },

    /// Invalid network topology
    #[error("Invalid network topology: {message}")]
    InvalidTopology { message: String },

    // ============ Simulation Errors ============
    /// Matrix and vector handed to the least-squares solve do not agree in size
    #[error("Invalid matrix dimensions: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The least-squares back end could not produce any solution
    #[error("Least-squares solve failed: {reason}")]
    NumericFailure { reason: String },

    /// A run aborted because the pressure solve failed in some iteration
    #[error("Solver aborted at iteration {}: {reason}", diagnostics.iteration)]
    SolveFailed {
        reason: String,
        diagnostics: Box<SolveDiagnostics>,
    },

    /// Invalid solver parameter
    #[error("Invalid solver parameter: {message}")]
    InvalidSolverParam { message: String },

    // ============ I/O Errors ============
    /// Error reading a network description file
    #[error("Failed to read network file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing the report or trace
    #[error("Failed to write '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl PhysarumError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid connection error
    pub fn invalid_connection(
        name: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidConnection {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a numeric failure error
    pub fn numeric(reason: impl Into<String>) -> Self {
        Self::NumericFailure {
            reason: reason.into(),
        }
    }

    /// Whether this error stems from the topology or parameters rather than
    /// from the numerics of a run.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            Self::NumericFailure { .. } | Self::SolveFailed { .. }
        )
    }

    /// Diagnostics of the failing iteration, if this is an aborted run.
    pub fn diagnostics(&self) -> Option<&SolveDiagnostics> {
        match self {
            Self::SolveFailed { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}
