//! 2-opt local search starting from the identity tour.
//!
//! The route is held as `0, 1, …, n-1, 0` and segment reversals are
//! applied whenever swapping two edges shortens it. Vertex 0 stays fixed
//! at both ends. A pass scans every `(i, k)` pair once; the search stops
//! after a pass with no improvement or after `max_passes` passes.

use crate::types::{AdjacencyMatrix, Tour};

/// Improvements smaller than this are treated as noise so floating-point
/// jitter cannot keep the search alive.
const IMPROVEMENT_EPSILON: f64 = 1e-12;

/// Improve the identity tour with 2-opt moves.
#[must_use]
pub fn two_opt(matrix: &AdjacencyMatrix, max_passes: usize) -> Tour {
    let n = matrix.len();
    let mut route: Vec<usize> = (0..n).collect();
    if n == 0 {
        return Tour::default();
    }
    route.push(0);

    let mut passes = 0;
    let mut improved = true;
    while improved && passes < max_passes {
        improved = false;
        passes += 1;

        for i in 1..n.saturating_sub(2) {
            for k in (i + 1)..(n - 1) {
                let (a, b) = (route[i - 1], route[i]);
                let (c, d) = (route[k], route[k + 1]);
                let delta = (matrix.weight(a, c) + matrix.weight(b, d))
                    - (matrix.weight(a, b) + matrix.weight(c, d));
                if delta < -IMPROVEMENT_EPSILON {
                    route[i..=k].reverse();
                    improved = true;
                }
            }
        }
    }

    log::debug!("2-opt finished after {passes} pass(es) on {n} vertices");

    route.truncate(n);
    Tour::new(route)
}
