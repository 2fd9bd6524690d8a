//! Double-tree heuristic: preorder walk of the minimum spanning tree.
//!
//! Doubling every tree edge gives an Eulerian multigraph; shortcutting
//! its circuit is the same as visiting the tree in depth-first preorder.
//! The walk starts at vertex 0 and descends into lighter subtrees first.
//! Tours are within a factor of 2 of optimal on metric inputs.

use crate::mst::{SpanningTree, kruskal};
use crate::types::{AdjacencyMatrix, Tour};

/// Build a tour from the depth-first preorder of the minimum spanning
/// tree, visiting neighbours in ascending edge weight.
#[must_use]
pub fn double_tree(matrix: &AdjacencyMatrix) -> Tour {
    let n = matrix.len();
    if n == 0 {
        return Tour::default();
    }
    let tree = kruskal(matrix);
    preorder(n, &tree)
}

/// Weighted depth-first preorder of `tree` from vertex 0.
fn preorder(n: usize, tree: &SpanningTree) -> Tour {
    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for edge in &tree.edges {
        adjacency[edge.src].push((edge.dst, edge.weight));
        adjacency[edge.dst].push((edge.src, edge.weight));
    }
    for neighbors in &mut adjacency {
        neighbors.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![0];

    while let Some(v) = stack.pop() {
        if visited[v] {
            continue;
        }
        visited[v] = true;
        order.push(v);
        // Pushed heaviest first so the lightest neighbour is popped next.
        stack.extend(
            adjacency[v]
                .iter()
                .rev()
                .map(|&(u, _)| u)
                .filter(|&u| !visited[u]),
        );
    }

    Tour::new(order)
}
