//! Turn an Eulerian circuit into a Hamiltonian tour by skipping repeats.

use crate::euler::EulerianCircuit;
use crate::types::Tour;

/// Keep the first occurrence of each vertex in circuit order.
///
/// With the triangle inequality each skipped stretch is replaced by a
/// direct edge that is no longer, so the tour costs at most the circuit.
/// The result has `n` vertices whenever the circuit touches every vertex
/// in `0..n`; vertices outside that range are ignored.
#[must_use]
pub fn shortcut(circuit: &EulerianCircuit, n: usize) -> Tour {
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    for &v in circuit.vertices() {
        if let Some(seen) = visited.get_mut(v)
            && !*seen
        {
            *seen = true;
            order.push(v);
        }
    }
    Tour::new(order)
}
