//! Minimum spanning tree of a complete graph via Kruskal's algorithm.

use serde::{Deserialize, Serialize};

use crate::disjoint_set::DisjointSet;
use crate::types::{AdjacencyMatrix, Edge};

/// A minimum spanning tree: `max(n - 1, 0)` edges, acyclic, spanning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpanningTree {
    /// Accepted edges, in the order Kruskal accepted them.
    pub edges: Vec<Edge>,
    /// Sum of the accepted edge weights.
    pub total_weight: f64,
}

impl SpanningTree {
    /// Number of tree edges.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the tree has no edges.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// All `n(n-1)/2` upper-triangle edges of the matrix, generated with
/// increasing `src` and then increasing `dst`.
#[must_use]
pub fn complete_edges(matrix: &AdjacencyMatrix) -> Vec<Edge> {
    let n = matrix.len();
    let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for src in 0..n {
        let row = matrix.row(src);
        for (dst, &weight) in row.iter().enumerate().skip(src + 1) {
            edges.push(Edge { src, dst, weight });
        }
    }
    edges
}

/// Build a minimum spanning tree with Kruskal's algorithm.
///
/// Edges are sorted stably by [`Edge::kruskal_order`], so equal weights
/// keep their generation order and the result is deterministic. Stops as soon as
/// `n - 1` edges have been accepted.
#[must_use]
pub fn kruskal(matrix: &AdjacencyMatrix) -> SpanningTree {
    let n = matrix.len();
    if n <= 1 {
        return SpanningTree::default();
    }

    let mut candidates = complete_edges(matrix);
    candidates.sort_by(Edge::kruskal_order);

    let target = n - 1;
    let mut sets = DisjointSet::new(n);
    let mut edges = Vec::with_capacity(target);
    let mut total_weight = 0.0;

    for edge in candidates {
        if sets.unite(edge.src, edge.dst) {
            total_weight += edge.weight;
            edges.push(edge);
            if edges.len() == target {
                break;
            }
        }
    }

    SpanningTree {
        edges,
        total_weight,
    }
}
