//! Flow-system assembly.
//!
//! Every node contributes one Kirchhoff equation. Row `j` sums the flow
//! arriving at node `j` from each neighbour `i`:
//!
//! ```text
//! sum_i  D_ij/L_ij * (p_i - p_j)  =  b_j
//! ```
//!
//! with `b_j = +I0` at sources, `-I0` at sinks and `0` elsewhere.

use nalgebra::{DMatrix, DVector};

use crate::network::Network;

/// Linear flow system `A p = b` for one iteration.
#[derive(Debug, Clone)]
pub struct FlowSystem {
    /// Lefthand side (n x n)
    pub lefthand: DMatrix<f64>,
    /// Righthand side (n)
    pub righthand: DVector<f64>,
}

impl FlowSystem {
    /// Create a zeroed system for `size` nodes.
    pub fn new(size: usize) -> Self {
        Self {
            lefthand: DMatrix::zeros(size, size),
            righthand: DVector::zeros(size),
        }
    }

    /// Number of nodes (rows).
    pub fn size(&self) -> usize {
        self.righthand.len()
    }

    /// Clear the matrix and vector to zero.
    pub fn clear(&mut self) {
        self.lefthand.fill(0.0);
        self.righthand.fill(0.0);
    }

    /// Stamp the contribution of neighbour `i` to the equation of node `j`.
    ///   A[j,i] += dl
    ///   A[j,j] -= dl
    pub fn stamp_dl(&mut self, j: usize, i: usize, dl: f64) {
        self.lefthand[(j, i)] += dl;
        self.lefthand[(j, j)] -= dl;
    }

    /// Remove the pressure unknown of node `k` from every equation.
    ///
    /// With the column empty the minimum-norm solve leaves that pressure at
    /// zero, i.e. the node is grounded.
    pub fn pin_to_zero(&mut self, k: usize) {
        self.lefthand.column_mut(k).fill(0.0);
    }

    /// Rebuild the system from the network's current conductivities.
    ///
    /// With `pin_sinks` set, sink pressures are fixed to zero for this
    /// assembly only.
    pub fn assemble(&mut self, network: &Network, i0: f64, pin_sinks: bool) {
        let n = network.node_count();
        if self.size() != n {
            *self = Self::new(n);
        } else {
            self.clear();
        }

        for j in 0..n {
            for i in 0..n {
                let dl = network.dl_fraction(i, j);
                if dl != 0.0 {
                    self.stamp_dl(j, i, dl);
                }
            }
        }

        for (k, node) in network.nodes().iter().enumerate() {
            if node.is_source() {
                self.righthand[k] = i0;
            } else if node.is_sink() {
                self.righthand[k] = -i0;
                if pin_sinks {
                    self.pin_to_zero(k);
                }
            }
        }
    }

    /// Rows of the lefthand side, for reports.
    pub fn lefthand_rows(&self) -> Vec<Vec<f64>> {
        self.lefthand
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}
