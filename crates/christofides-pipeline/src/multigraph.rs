//! Union of the spanning tree and the matching as an undirected multigraph.

use serde::{Deserialize, Serialize};

use crate::matching::Matching;
use crate::mst::SpanningTree;

/// Undirected multigraph stored as adjacency lists.
///
/// Every edge appears in both endpoints' lists. Parallel edges are kept:
/// a matching pair that duplicates a tree edge yields two entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Multigraph {
    /// Neighbour lists, indexed by vertex.
    pub adjacency: Vec<Vec<usize>>,
}

impl Multigraph {
    /// Combine the tree edges and the matched pairs over `n` vertices.
    ///
    /// Tree edges are inserted first, then matching pairs, each in input
    /// order.
    #[must_use]
    pub fn assemble(n: usize, tree: &SpanningTree, matching: &Matching) -> Self {
        let mut adjacency = vec![Vec::new(); n];
        let tree_pairs = tree.edges.iter().map(|e| (e.src, e.dst));
        for (a, b) in tree_pairs.chain(matching.pairs.iter().copied()) {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        Self { adjacency }
    }

    /// Number of vertices.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Degree of `v`, counting parallel edges.
    #[must_use]
    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    /// Neighbours of `v`, with repeats for parallel edges.
    #[must_use]
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjacency[v]
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Largest vertex degree, or 0 for an empty graph.
    #[must_use]
    pub fn max_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Returns `true` if every vertex has even degree.
    #[must_use]
    pub fn is_even(&self) -> bool {
        self.adjacency.iter().all(|list| list.len() % 2 == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::MatchingKind;
    use crate::types::Edge;

    fn path_tree() -> SpanningTree {
        SpanningTree {
            edges: vec![Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0)],
            total_weight: 2.0,
        }
    }

    #[test]
    fn assemble_tree_only() {
        let g = Multigraph::assemble(3, &path_tree(), &Matching::default());
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.neighbors(1), &[0, 2]);
        assert!(!g.is_even());
    }

    #[test]
    fn assemble_adds_matching_after_tree() {
        let matching = Matching {
            kind: MatchingKind::Greedy,
            pairs: vec![(0, 2)],
        };
        let g = Multigraph::assemble(3, &path_tree(), &matching);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.neighbors(0), &[1, 2]);
        assert_eq!(g.neighbors(2), &[1, 0]);
        assert!(g.is_even());
        assert_eq!(g.max_degree(), 2);
    }

    #[test]
    fn parallel_edges_are_kept() {
        let tree = SpanningTree {
            edges: vec![Edge::new(0, 1, 1.0)],
            total_weight: 1.0,
        };
        let matching = Matching {
            kind: MatchingKind::Exact,
            pairs: vec![(0, 1)],
        };
        let g = Multigraph::assemble(2, &tree, &matching);
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.neighbors(0), &[1, 1]);
        assert_eq!(g.edge_count(), 2);
        assert!(g.is_even());
    }

    #[test]
    fn empty_graph() {
        let g = Multigraph::assemble(0, &SpanningTree::default(), &Matching::default());
        assert_eq!(g.vertex_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.max_degree(), 0);
        assert!(g.is_even());
    }
}
