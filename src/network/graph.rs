//! Network graph structure.

use std::collections::HashMap;

use super::connection::{Connection, FeedbackLaw};
use super::node::Node;
use super::types::{NodeId, NodeRole};
use crate::dsl::NetworkAst;
use crate::error::{PhysarumError, Result};

/// Keys accepted after the length and conductivity of a connection line.
const CONNECTION_PARAMS: [&str; 4] = ["law", "alpha", "k", "weight"];

/// A fixed topology of nodes and connections ready for solving.
///
/// The adjacency lookup is built once on construction. Nodes and connections
/// can be inspected and their state mutated, but none can be added or
/// removed, so the lookup stays consistent for the lifetime of the network.
#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    /// Node id to position in `nodes`
    index: HashMap<NodeId, usize>,
    /// Positions of (start, end) for each connection
    endpoints: Vec<(usize, usize)>,
    /// Row-major `n x n` table of the connection joining each ordered pair
    adjacency: Vec<Option<usize>>,
}

impl Network {
    /// Build a network, resolving every connection endpoint against the
    /// node collection.
    ///
    /// Fails if node ids repeat, a connection references an unknown node,
    /// or a connection length is not strictly positive.
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>) -> Result<Self> {
        super::validate::validate_lengths(&connections)?;

        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id(), i).is_some() {
                return Err(PhysarumError::DuplicateNode { id: node.id() });
            }
        }

        let resolve = |connection: usize, node: NodeId| {
            index
                .get(&node)
                .copied()
                .ok_or(PhysarumError::NodeNotFound { connection, node })
        };

        let endpoints = connections
            .iter()
            .enumerate()
            .map(|(c, con)| Ok((resolve(c, con.start())?, resolve(c, con.end())?)))
            .collect::<Result<Vec<_>>>()?;

        let n = nodes.len();
        let mut adjacency = vec![None; n * n];
        // A later connection between the same pair takes over the entry
        for (c, &(s, e)) in endpoints.iter().enumerate() {
            adjacency[s * n + e] = Some(c);
            adjacency[e * n + s] = Some(c);
        }

        Ok(Self {
            nodes,
            connections,
            index,
            endpoints,
            adjacency,
        })
    }

    /// Build a network from a parsed description.
    ///
    /// Node ids are assigned in order of first appearance.
    pub fn from_ast(ast: &NetworkAst) -> Result<Self> {
        let mut node_map: HashMap<String, usize> = HashMap::new();
        let mut nodes: Vec<Node> = Vec::new();

        fn intern(
            name: &str,
            node_map: &mut HashMap<String, usize>,
            nodes: &mut Vec<Node>,
        ) -> usize {
            if let Some(&id) = node_map.get(name) {
                return id;
            }
            let id = nodes.len();
            let mut node = Node::new(id);
            node.set_name(name);
            nodes.push(node);
            node_map.insert(name.to_string(), id);
            id
        }

        for decl in &ast.nodes {
            let id = intern(&decl.name, &mut node_map, &mut nodes);
            if let Some(label) = &decl.label {
                nodes[id].set_name(label.clone());
            }
        }

        let mut connections = Vec::with_capacity(ast.connections.len());
        for def in &ast.connections {
            let start = intern(&def.start, &mut node_map, &mut nodes);
            let end = intern(&def.end, &mut node_map, &mut nodes);

            let mut unknown: Vec<&str> = def
                .params
                .keys()
                .map(String::as_str)
                .filter(|key| !CONNECTION_PARAMS.contains(key))
                .collect();
            unknown.sort_unstable();
            if let Some(key) = unknown.first() {
                return Err(PhysarumError::invalid_connection(
                    &def.name,
                    def.line,
                    format!("unknown parameter '{}' (expected law, alpha, k or weight)", key),
                ));
            }

            let law = match def.params.get("law") {
                Some(&v) => FeedbackLaw::from_index(v as u32)
                    .filter(|_| v.fract() == 0.0)
                    .ok_or_else(|| {
                        PhysarumError::invalid_connection(
                            &def.name,
                            def.line,
                            format!("unknown feedback law {} (expected 1, 2 or 3)", v),
                        )
                    })?,
                None => FeedbackLaw::default(),
            };

            let mut con = Connection::new(NodeId(start), NodeId(end), def.length, def.conductivity)
                .with_name(def.name.clone())
                .with_law(law);
            if let Some(&alpha) = def.params.get("alpha") {
                con.set_alpha(alpha);
            }
            if let Some(&k) = def.params.get("k") {
                con.set_saturation(k);
            }
            if let Some(&weight) = def.params.get("weight") {
                con.set_weight(weight);
            }
            connections.push(con);
        }

        for name in &ast.sources {
            let id = intern(name, &mut node_map, &mut nodes);
            nodes[id].set_role(NodeRole::Source);
        }
        for name in &ast.sinks {
            let id = intern(name, &mut node_map, &mut nodes);
            nodes[id].set_role(NodeRole::Sink);
        }

        Self::new(nodes, connections)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Mutable access to a connection's state.
    ///
    /// Endpoints and length cannot change through this handle.
    pub fn connection_mut(&mut self, index: usize) -> Option<&mut Connection> {
        self.connections.get_mut(index)
    }

    /// Position of a node in the node collection.
    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Find a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index(id).map(|i| &self.nodes[i])
    }

    /// Find a node by id, mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.node_index(id).map(move |i| &mut self.nodes[i])
    }

    /// Find a node by display name.
    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    /// Node positions of a connection's (start, end).
    pub fn endpoints(&self, connection: usize) -> (usize, usize) {
        self.endpoints[connection]
    }

    /// Connection joining the nodes at positions `i` and `j`, in either order.
    pub fn connection_at(&self, i: usize, j: usize) -> Option<&Connection> {
        let n = self.nodes.len();
        self.adjacency[i * n + j].map(|c| &self.connections[c])
    }

    /// Connection joining two nodes, looked up by id.
    pub fn connection_between(&self, a: NodeId, b: NodeId) -> Option<&Connection> {
        let i = self.node_index(a)?;
        let j = self.node_index(b)?;
        self.connection_at(i, j)
    }

    /// D/L of the connection between the nodes at positions `i` and `j`.
    ///
    /// Zero when the nodes are not connected, and zero for `i == j` even if
    /// a self-loop exists.
    pub fn dl_fraction(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        self.connection_at(i, j).map_or(0.0, Connection::dl_fraction)
    }

    /// D/L between two nodes looked up by id; `None` if either id is unknown.
    pub fn dl_fraction_between(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let i = self.node_index(a)?;
        let j = self.node_index(b)?;
        Some(self.dl_fraction(i, j))
    }

    /// Write solved pressures into the nodes, by position.
    pub(crate) fn set_pressures(&mut self, pressures: &[f64]) {
        for (node, &p) in self.nodes.iter_mut().zip(pressures) {
            node.set_pressure(p);
        }
    }

    /// Recompute flux and conductivity of every connection from the current
    /// node pressures.
    pub(crate) fn update_connections(&mut self, mue: f64) {
        for (con, &(s, e)) in self.connections.iter_mut().zip(&self.endpoints) {
            let p_start = self.nodes[s].pressure();
            let p_end = self.nodes[e].pressure();
            con.update_flux_and_conductivity(p_start, p_end, mue);
        }
    }
}
