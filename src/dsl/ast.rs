//! Abstract Syntax Tree types for the network description language.

use std::collections::HashMap;

/// Complete AST representation of a parsed network.
#[derive(Debug, Clone, Default)]
pub struct NetworkAst {
    /// Every node name in order of first mention, with optional label
    pub nodes: Vec<NodeDecl>,
    /// All connection definitions
    pub connections: Vec<ConnectionDef>,
    /// Node names marked as sources
    pub sources: Vec<String>,
    /// Node names marked as sinks
    pub sinks: Vec<String>,
    /// Solver parameters from `.param` directives
    pub params: Vec<ParamDef>,
}

impl NetworkAst {
    /// Create a new empty network AST.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node name, keeping first-mention order.
    pub(crate) fn mention(&mut self, name: &str) -> usize {
        if let Some(pos) = self.nodes.iter().position(|n| n.name == name) {
            return pos;
        }
        self.nodes.push(NodeDecl {
            name: name.to_string(),
            label: None,
        });
        self.nodes.len() - 1
    }
}

/// A node mentioned in the description.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDecl {
    /// Name used to reference the node
    pub name: String,
    /// Display name from a `.node` directive
    pub label: Option<String>,
}

/// A connection definition.
#[derive(Debug, Clone)]
pub struct ConnectionDef {
    /// Connection name
    pub name: String,
    /// Start node name
    pub start: String,
    /// End node name
    pub end: String,
    /// Tube length
    pub length: f64,
    /// Initial conductivity
    pub conductivity: f64,
    /// Optional `key=value` parameters (law, alpha, k, weight)
    pub params: HashMap<String, f64>,
    /// Source line number for error reporting
    pub line: usize,
}

/// A solver parameter assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    /// Parameter key, lowercased
    pub name: String,
    /// Value
    pub value: f64,
    /// Source line number
    pub line: usize,
}
