//! Degree counting and odd-degree vertex extraction.

use crate::types::Edge;

/// Degree of every vertex in `0..n` for the given edge set.
#[must_use]
pub fn degrees(n: usize, edges: &[Edge]) -> Vec<usize> {
    let mut degree = vec![0; n];
    for edge in edges {
        degree[edge.src] += 1;
        degree[edge.dst] += 1;
    }
    degree
}

/// Vertices of odd degree, in ascending order.
///
/// By the handshake lemma the result always has even length.
#[must_use]
pub fn odd_degree_vertices(n: usize, edges: &[Edge]) -> Vec<usize> {
    degrees(n, edges)
        .into_iter()
        .enumerate()
        .filter_map(|(v, d)| (d % 2 == 1).then_some(v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_graph_has_odd_endpoints() {
        let edges = [Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0), Edge::new(2, 3, 1.0)];
        assert_eq!(degrees(4, &edges), vec![1, 2, 2, 1]);
        assert_eq!(odd_degree_vertices(4, &edges), vec![0, 3]);
    }

    #[test]
    fn star_has_odd_center_when_leaf_count_is_odd() {
        let edges = [Edge::new(0, 1, 1.0), Edge::new(0, 2, 1.0), Edge::new(0, 3, 1.0)];
        assert_eq!(odd_degree_vertices(4, &edges), vec![0, 1, 2, 3]);
    }

    #[test]
    fn star_with_even_leaves_leaves_center_even() {
        let edges = [
            Edge::new(0, 1, 1.0),
            Edge::new(0, 2, 1.0),
            Edge::new(0, 3, 1.0),
            Edge::new(0, 4, 1.0),
        ];
        assert_eq!(odd_degree_vertices(5, &edges), vec![1, 2, 3, 4]);
    }

    #[test]
    fn no_edges_no_odd_vertices() {
        assert!(odd_degree_vertices(3, &[]).is_empty());
        assert!(odd_degree_vertices(0, &[]).is_empty());
    }

    #[test]
    fn result_is_always_even() {
        let edges = [
            Edge::new(0, 1, 1.0),
            Edge::new(1, 2, 1.0),
            Edge::new(1, 3, 1.0),
            Edge::new(3, 4, 1.0),
            Edge::new(3, 5, 1.0),
        ];
        let odd = odd_degree_vertices(6, &edges);
        assert_eq!(odd.len() % 2, 0);
        assert_eq!(odd, vec![0, 1, 2, 3, 4, 5]);
    }
}
