//! Network vertices.

use super::types::{NodeId, NodeRole};

/// A junction in the network holding a role and the current pressure.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: Option<String>,
    role: NodeRole,
    pressure: f64,
}

impl Node {
    /// Create a normal node with zero pressure.
    pub fn new(id: usize) -> Self {
        Self::with_role(id, NodeRole::Normal)
    }

    /// Create a node with the given role.
    pub fn with_role(id: usize, role: NodeRole) -> Self {
        Self {
            id: NodeId(id),
            name: None,
            role,
            pressure: 0.0,
        }
    }

    /// Create a source node.
    pub fn source(id: usize) -> Self {
        Self::with_role(id, NodeRole::Source)
    }

    /// Create a sink node.
    pub fn sink(id: usize) -> Self {
        Self::with_role(id, NodeRole::Sink)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display name; falls back to `Node{id}` when unset or empty.
    pub fn name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Node{}", self.id),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn set_role(&mut self, role: NodeRole) {
        self.role = role;
    }

    pub fn is_source(&self) -> bool {
        self.role == NodeRole::Source
    }

    pub fn is_sink(&self) -> bool {
        self.role == NodeRole::Sink
    }

    /// Mark or unmark the node as a source. Unmarking makes it normal.
    pub fn set_source(&mut self, source: bool) {
        self.role = if source { NodeRole::Source } else { NodeRole::Normal };
    }

    /// Mark or unmark the node as a sink. Unmarking makes it normal.
    pub fn set_sink(&mut self, sink: bool) {
        self.role = if sink { NodeRole::Sink } else { NodeRole::Normal };
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn set_pressure(&mut self, pressure: f64) {
        self.pressure = pressure;
    }

    /// One-line description used in topology snapshots.
    pub fn description(&self) -> String {
        format!(
            "Node: id = {}\tpressure = {}\t{}",
            self.id, self.pressure, self.role
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name() {
        let mut node = Node::new(7);
        assert_eq!(node.name(), "Node7");

        node.set_name("");
        assert_eq!(node.name(), "Node7");

        node.set_name("entrance");
        assert_eq!(node.name(), "entrance");
    }

    #[test]
    fn test_roles_are_exclusive() {
        let mut node = Node::new(0);
        assert_eq!(node.role(), NodeRole::Normal);

        node.set_source(true);
        assert!(node.is_source());
        assert!(!node.is_sink());

        node.set_sink(true);
        assert!(node.is_sink());
        assert!(!node.is_source());

        node.set_sink(false);
        assert_eq!(node.role(), NodeRole::Normal);
    }
}
