//! Shared types for the tour construction pipeline.

use serde::{Deserialize, Serialize};

use crate::euler::EulerianCircuit;
use crate::matching::{Matching, MatchingKind};
use crate::mst::SpanningTree;
use crate::multigraph::Multigraph;
use crate::strategy::TourStrategyKind;

/// A complete weighted graph stored as a dense row-major `n×n` matrix.
///
/// The matrix is expected to be symmetric with a zero diagonal and
/// non-negative weights. These properties are an input contract and are
/// not checked at construction time; only the shape is validated.
///
/// Serializes as a list of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct AdjacencyMatrix {
    n: usize,
    weights: Vec<f64>,
}

impl AdjacencyMatrix {
    /// Create a matrix for `n` vertices from a row-major weight buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TourError::DimensionMismatch`] if `weights.len()` is not
    /// `n * n`.
    pub fn new(n: usize, weights: Vec<f64>) -> Result<Self, TourError> {
        let expected = n.saturating_mul(n);
        if weights.len() != expected {
            return Err(TourError::DimensionMismatch {
                expected,
                actual: weights.len(),
            });
        }
        Ok(Self { n, weights })
    }

    /// Create a matrix from a list of rows.
    ///
    /// # Errors
    ///
    /// Returns [`TourError::DimensionMismatch`] if any row's length
    /// differs from the number of rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, TourError> {
        let n = rows.len();
        let mut weights = Vec::with_capacity(n.saturating_mul(n));
        for row in rows {
            if row.len() != n {
                return Err(TourError::DimensionMismatch {
                    expected: n,
                    actual: row.len(),
                });
            }
            weights.extend(row);
        }
        Ok(Self { n, weights })
    }

    /// Create a matrix by evaluating `weight(i, j)` for every cell.
    #[must_use]
    pub fn from_fn(n: usize, weight: impl Fn(usize, usize) -> f64) -> Self {
        let weights = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .map(|(i, j)| weight(i, j))
            .collect();
        Self { n, weights }
    }

    /// Number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.n
    }

    /// Returns `true` if the graph has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Weight of the edge between `i` and `j`.
    ///
    /// Indices must be in `0..len()`.
    #[must_use]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.weights[i * self.n + j]
    }

    /// The weights of row `i`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.weights[i * self.n..(i + 1) * self.n]
    }

    /// The full row-major weight buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }
}

impl TryFrom<Vec<Vec<f64>>> for AdjacencyMatrix {
    type Error = TourError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<AdjacencyMatrix> for Vec<Vec<f64>> {
    fn from(matrix: AdjacencyMatrix) -> Self {
        if matrix.n == 0 {
            return Self::new();
        }
        matrix
            .weights
            .chunks(matrix.n)
            .map(<[f64]>::to_vec)
            .collect()
    }
}

/// An undirected weighted edge with `src < dst`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Lower endpoint.
    pub src: usize,
    /// Higher endpoint.
    pub dst: usize,
    /// Edge weight.
    pub weight: f64,
}

impl Edge {
    /// Create an edge, ordering the endpoints so that `src < dst`.
    #[must_use]
    pub const fn new(a: usize, b: usize, weight: f64) -> Self {
        if a <= b {
            Self {
                src: a,
                dst: b,
                weight,
            }
        } else {
            Self {
                src: b,
                dst: a,
                weight,
            }
        }
    }

    /// Total order used by Kruskal: weight first, then generation order
    /// (`src`, then `dst`).
    #[must_use]
    pub fn kruskal_order(&self, other: &Self) -> std::cmp::Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then(self.src.cmp(&other.src))
            .then(self.dst.cmp(&other.dst))
    }
}

/// A Hamiltonian tour: an ordering of vertex indices, implicitly closed
/// (the last vertex connects back to the first).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tour(Vec<usize>);

impl Tour {
    /// Create a tour from a vertex ordering.
    #[must_use]
    pub const fn new(vertices: Vec<usize>) -> Self {
        Self(vertices)
    }

    /// Returns `true` if the tour visits no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of vertices written to the tour.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// The visiting order.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.0
    }

    /// Consumes the tour and returns the underlying vertex order.
    #[must_use]
    pub fn into_vertices(self) -> Vec<usize> {
        self.0
    }

    /// Total weight of the closed tour, including the edge from the last
    /// vertex back to the first.
    #[must_use]
    pub fn cost(&self, matrix: &AdjacencyMatrix) -> f64 {
        let Some(&first) = self.0.first() else {
            return 0.0;
        };
        let open: f64 = self
            .0
            .windows(2)
            .map(|pair| matrix.weight(pair[0], pair[1]))
            .sum();
        let last = self.0[self.0.len() - 1];
        open + matrix.weight(last, first)
    }

    /// Returns `true` if the tour is a permutation of `0..n`.
    ///
    /// A tour shorter than `n` is truncated and must not be treated as a
    /// solution.
    #[must_use]
    pub fn is_complete(&self, n: usize) -> bool {
        if self.0.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &v in &self.0 {
            if v >= n || seen[v] {
                return false;
            }
            seen[v] = true;
        }
        true
    }
}

/// Every intermediate of a Christofides run, from spanning tree to tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedTour {
    /// Minimum spanning tree.
    pub tree: SpanningTree,
    /// Odd-degree tree vertices, ascending.
    pub odd: Vec<usize>,
    /// Perfect matching on `odd`.
    pub matching: Matching,
    /// Tree plus matching.
    pub multigraph: Multigraph,
    /// Eulerian circuit of `multigraph`.
    pub circuit: EulerianCircuit,
    /// Shortcut tour.
    pub tour: Tour,
}

/// Configuration for building a tour.
///
/// # Future work
///
/// `two_opt_max_passes` only affects [`TourStrategyKind::TwoOpt`]; a
/// per-strategy settings struct would make that explicit once more
/// strategy-specific knobs exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Which tour construction strategy to run.
    pub strategy: TourStrategyKind,

    /// Which perfect-matching engine the Christofides pipeline uses to
    /// fix odd-degree vertices.
    pub matching: MatchingKind,

    /// Upper bound on full improvement passes for the 2-opt strategy.
    ///
    /// Must be at least 1.
    pub two_opt_max_passes: usize,
}

impl TourConfig {
    /// Default tour construction strategy.
    pub const DEFAULT_STRATEGY: TourStrategyKind = TourStrategyKind::Christofides;

    /// Default matching engine.
    pub const DEFAULT_MATCHING: MatchingKind = MatchingKind::Exact;

    /// Default 2-opt pass limit.
    pub const DEFAULT_TWO_OPT_MAX_PASSES: usize = 1000;

    /// Check the configuration for out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`TourError::InvalidConfig`] if `two_opt_max_passes` is 0.
    pub fn validate(&self) -> Result<(), TourError> {
        if self.two_opt_max_passes == 0 {
            return Err(TourError::InvalidConfig(
                "two_opt_max_passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            strategy: Self::DEFAULT_STRATEGY,
            matching: Self::DEFAULT_MATCHING,
            two_opt_max_passes: Self::DEFAULT_TWO_OPT_MAX_PASSES,
        }
    }
}

/// Errors that can occur while building a tour.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TourError {
    /// A buffer or vertex index does not fit the matrix dimensions.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The size implied by the vertex count.
        expected: usize,
        /// The size actually supplied.
        actual: usize,
    },

    /// The matching engine received an odd number of vertices. This means
    /// the spanning tree stage produced an impossible degree sequence.
    #[error("cannot perfectly match an odd number of vertices ({0})")]
    OddVertexCount(usize),

    /// The exact matching solver left a vertex unmatched.
    #[error("matching solver left vertex {vertex} unmatched")]
    IncompleteMatching {
        /// The original graph index of the unmatched vertex.
        vertex: usize,
    },

    /// Two vertices handed to the matching engine are joined by a NaN or
    /// infinite weight.
    #[error("weight between vertices {src} and {dst} is not finite")]
    NonFiniteWeight {
        /// Endpoint listed first in the odd vertex set.
        src: usize,
        /// Endpoint listed later in the odd vertex set.
        dst: usize,
    },

    /// Sample text could not be parsed into a square matrix.
    #[error("invalid sample: {0}")]
    InvalidSample(String),

    /// Configuration is invalid.
    #[error("invalid tour configuration: {0}")]
    InvalidConfig(String),
}
