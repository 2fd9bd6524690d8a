//! Eulerian circuit extraction with Hierholzer's algorithm.

use serde::{Deserialize, Serialize};

use crate::multigraph::Multigraph;

/// A closed walk that uses every edge of a multigraph exactly once.
///
/// For a graph with `m` edges the walk holds `m + 1` vertices and starts
/// and ends at the same vertex.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EulerianCircuit(Vec<usize>);

impl EulerianCircuit {
    /// The vertex sequence, first and last equal.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.0
    }

    /// Number of vertices in the walk (edges + 1).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the walk is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Find an Eulerian circuit of `graph`.
///
/// The graph must be connected over its non-isolated vertices and every
/// degree must be even. The walk starts at the first vertex with nonzero
/// degree. Neighbours are taken from the back of each list, and the
/// reverse occurrence is dropped with `swap_remove`, which reorders the
/// neighbour's list. That ordering choice decides *which* circuit comes
/// out, never whether it is valid.
///
/// An edgeless graph yields `[0]` (or nothing when it has no vertices),
/// so a single-vertex instance still produces a one-city tour.
#[must_use]
pub fn eulerian_circuit(graph: &Multigraph) -> EulerianCircuit {
    let n = graph.vertex_count();
    if n == 0 {
        return EulerianCircuit::default();
    }

    let Some(start) = (0..n).find(|&v| graph.degree(v) > 0) else {
        return EulerianCircuit(vec![0]);
    };

    let mut remaining = graph.adjacency.clone();
    let mut stack = vec![start];
    let mut circuit = Vec::with_capacity(graph.edge_count() + 1);

    while let Some(&current) = stack.last() {
        if let Some(next) = remaining[current].pop() {
            if let Some(pos) = remaining[next].iter().position(|&u| u == current) {
                remaining[next].swap_remove(pos);
            }
            stack.push(next);
        } else {
            circuit.push(current);
            stack.pop();
        }
    }

    circuit.reverse();
    EulerianCircuit(circuit)
}
