//! Human-readable tour rendering.

use std::fmt::Write;

use christofides_pipeline::Tour;

/// Render a tour as `0 -> 3 -> 2 -> 1 -> 0`.
///
/// The closing edge back to the first vertex is always shown, so a
/// single-vertex tour renders as `0 -> 0`. An empty tour renders as an
/// empty string.
#[must_use]
pub fn format_path(tour: &Tour) -> String {
    let vertices = tour.vertices();
    let Some(&first) = vertices.first() else {
        return String::new();
    };
    let mut out = String::with_capacity(vertices.len() * 5);
    let _ = write!(out, "{first}");
    for &v in vertices.iter().skip(1).chain(std::iter::once(&first)) {
        let _ = write!(out, " -> {v}");
    }
    out
}
