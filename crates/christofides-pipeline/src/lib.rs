//! christofides-pipeline: TSP tour construction on dense distance matrices
//! (sans-IO).
//!
//! Builds a Hamiltonian tour of a complete, symmetric, non-negative
//! weighted graph with the Christofides–Serdyukov construction:
//! minimum spanning tree -> odd-degree vertices -> perfect matching ->
//! Eulerian circuit of the combined multigraph -> shortcut.
//!
//! The double-tree and 2-opt heuristics are available as alternative
//! [`TourStrategyKind`] variants for comparison.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! matrices and sample text, and takes time from an injected
//! [`diagnostics::Clock`]. File handling and the CLI live in
//! `christofides-bench`.

pub mod diagnostics;
pub mod disjoint_set;
pub mod double_tree;
pub mod euler;
pub mod matching;
pub mod mst;
pub mod multigraph;
pub mod parity;
pub mod pipeline;
pub mod sample;
pub mod shortcut;
pub mod strategy;
pub mod two_opt;
pub mod types;

pub use disjoint_set::DisjointSet;
pub use euler::{EulerianCircuit, eulerian_circuit};
pub use matching::{Matching, MatchingKind, PerfectMatcher};
pub use mst::{SpanningTree, complete_edges, kruskal};
pub use multigraph::Multigraph;
pub use parity::{degrees, odd_degree_vertices};
pub use pipeline::Pipeline;
pub use sample::{Sample, expected_cost_from_file_name, parse_matrix};
pub use shortcut::shortcut;
pub use strategy::{TourBuilder, TourStrategyKind};
pub use types::{AdjacencyMatrix, Edge, StagedTour, Tour, TourConfig, TourError};

use log::{info, warn};

/// Build a tour with the strategy selected in `config`.
///
/// # Errors
///
/// Returns [`TourError::InvalidConfig`] if `config` fails validation,
/// or any error from the selected strategy.
pub fn build_tour(matrix: &AdjacencyMatrix, config: &TourConfig) -> Result<Tour, TourError> {
    config.validate()?;
    let tour = config.strategy.build_tour(matrix, config)?;
    if !tour.is_complete(matrix.len()) {
        warn!(
            "{} produced a truncated tour: {} of {} vertices",
            config.strategy,
            tour.len(),
            matrix.len()
        );
    }
    Ok(tour)
}

/// Build a Christofides tour.
///
/// With [`MatchingKind::Exact`] on a metric input the tour costs at most
/// 3/2 of the optimum. [`MatchingKind::Greedy`] is faster but carries no
/// such guarantee.
///
/// # Pipeline steps
///
/// 1. Minimum spanning tree (Kruskal)
/// 2. Odd-degree vertices of the tree
/// 3. Perfect matching on the odd vertices
/// 4. Multigraph of tree plus matching
/// 5. Eulerian circuit (Hierholzer)
/// 6. Shortcut repeated vertices
///
/// An empty matrix yields an empty tour and a single vertex yields `[0]`.
///
/// # Errors
///
/// Returns [`TourError::OddVertexCount`] or
/// [`TourError::IncompleteMatching`] if the matching stage fails.
pub fn christofides(matrix: &AdjacencyMatrix, matching: MatchingKind) -> Result<Tour, TourError> {
    if matrix.len() <= 1 {
        return Ok(Tour::new((0..matrix.len()).collect()));
    }
    if !matching.preserves_bound() {
        info!("christofides with {matching} matching: 3/2 bound does not apply");
    }
    Ok(Pipeline::new(matrix, matching)
        .span()
        .find_odd()
        .match_odd()?
        .assemble()
        .traverse()
        .shortcut()
        .into_tour())
}

/// Run the Christofides pipeline and keep every intermediate.
///
/// # Errors
///
/// Returns [`TourError`] if the matching stage fails.
pub fn process_staged(
    matrix: &AdjacencyMatrix,
    matching: MatchingKind,
) -> Result<StagedTour, TourError> {
    use pipeline::PipelineStage;
    Pipeline::new(matrix, matching).complete()
}
