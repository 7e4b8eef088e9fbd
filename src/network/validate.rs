//! Network validation.

use crate::error::{PhysarumError, Result};

use super::{Connection, Network};

/// Reject connections whose length is not a finite, strictly positive number.
///
/// Every iteration divides by the length, so this is checked once up front
/// rather than on each division.
pub fn validate_lengths(connections: &[Connection]) -> Result<()> {
    for (i, con) in connections.iter().enumerate() {
        let length = con.length();
        if !(length.is_finite() && length > 0.0) {
            return Err(PhysarumError::InvalidLength {
                connection: i,
                length,
            });
        }
    }
    Ok(())
}

/// Topology checks that do not prevent solving but usually indicate a
/// mistake in the fixture.
///
/// Returns a list of human-readable warnings:
/// - no source or no sink (no current is injected or extracted)
/// - nodes without any connection (their pressure stays at the offset)
pub fn topology_warnings(network: &Network) -> Vec<String> {
    let mut warnings = Vec::new();

    if !network.nodes().iter().any(|n| n.is_source()) {
        warnings.push("network has no source node".to_string());
    }
    if !network.nodes().iter().any(|n| n.is_sink()) {
        warnings.push("network has no sink node".to_string());
    }

    let mut degree = vec![0usize; network.node_count()];
    for c in 0..network.connection_count() {
        let (s, e) = network.endpoints(c);
        degree[s] += 1;
        degree[e] += 1;
    }
    for (node, &d) in network.nodes().iter().zip(&degree) {
        if d == 0 {
            warnings.push(format!("{} has no connections", node.name()));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Node, NodeId};

    #[test]
    fn test_rejects_non_positive_length() {
        for length in [0.0, -1.0, f64::NAN] {
            let connections = vec![Connection::new(NodeId(0), NodeId(1), length, 1.0)];
            let err = validate_lengths(&connections).unwrap_err();
            assert!(matches!(err, PhysarumError::InvalidLength { connection: 0, .. }));
        }
    }

    #[test]
    fn test_warnings() {
        let nodes = vec![Node::source(0), Node::new(1), Node::new(2)];
        let connections = vec![Connection::new(NodeId(0), NodeId(1), 1.0, 1.0)];
        let net = Network::new(nodes, connections).unwrap();

        let warnings = topology_warnings(&net);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("no sink"));
        assert!(warnings[1].contains("Node2"));
    }
}
