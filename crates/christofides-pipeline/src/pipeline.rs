//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process_staged`] which runs the entire pipeline in one
//! call, [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use christofides_pipeline::{AdjacencyMatrix, MatchingKind, Pipeline, TourError};
//! # fn run(matrix: &AdjacencyMatrix) -> Result<(), TourError> {
//! let staged = Pipeline::new(matrix, MatchingKind::Exact)
//!     .span()
//!     .find_odd()
//!     .match_odd()?
//!     .assemble()
//!     .traverse()
//!     .shortcut()
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for the fallible matching stage), carrying all previously
//! computed intermediates. The matrix is borrowed for the whole run.

use log::debug;

use crate::diagnostics::StageMetrics;
use crate::euler::{EulerianCircuit, eulerian_circuit};
use crate::matching::{Matching, MatchingKind, PerfectMatcher};
use crate::mst::{SpanningTree, kruskal};
use crate::multigraph::Multigraph;
use crate::parity::odd_degree_vertices;
use crate::types::{AdjacencyMatrix, StagedTour, Tour, TourError};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`span`](Self::span) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .span() to continue"]
pub struct Pending<'a> {
    matrix: &'a AdjacencyMatrix,
    matching: MatchingKind,
}

impl<'a> Pending<'a> {
    /// The input matrix.
    #[must_use]
    pub const fn matrix(&self) -> &'a AdjacencyMatrix {
        self.matrix
    }

    /// Build the minimum spanning tree and advance to [`Spanned`].
    pub fn span(self) -> Spanned<'a> {
        let tree = kruskal(self.matrix);
        debug!(
            "span: {} tree edges over {} vertices, weight {:.6}",
            tree.len(),
            self.matrix.len(),
            tree.total_weight
        );
        Spanned {
            matrix: self.matrix,
            matching: self.matching,
            tree,
        }
    }
}

// ───────────────────────── Stage 1: Spanned ──────────────────────────

/// Pipeline state after building the minimum spanning tree.
///
/// Call [`find_odd`](Self::find_odd) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .find_odd() to continue"]
pub struct Spanned<'a> {
    matrix: &'a AdjacencyMatrix,
    matching: MatchingKind,
    tree: SpanningTree,
}

impl<'a> Spanned<'a> {
    /// The minimum spanning tree.
    #[must_use]
    pub const fn tree(&self) -> &SpanningTree {
        &self.tree
    }

    /// Collect the odd-degree tree vertices and advance to [`OddFound`].
    pub fn find_odd(self) -> OddFound<'a> {
        let odd = odd_degree_vertices(self.matrix.len(), &self.tree.edges);
        debug!("find_odd: {} odd-degree vertices", odd.len());
        OddFound {
            matrix: self.matrix,
            matching: self.matching,
            tree: self.tree,
            odd,
        }
    }
}

// ───────────────────────── Stage 2: OddFound ─────────────────────────

/// Pipeline state after extracting the odd-degree vertices.
///
/// Call [`match_odd`](Self::match_odd) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .match_odd() to continue"]
pub struct OddFound<'a> {
    matrix: &'a AdjacencyMatrix,
    matching: MatchingKind,
    tree: SpanningTree,
    odd: Vec<usize>,
}

impl<'a> OddFound<'a> {
    /// Odd-degree vertices of the tree, ascending.
    #[must_use]
    pub fn odd(&self) -> &[usize] {
        &self.odd
    }

    /// Perfectly match the odd vertices and advance to [`Matched`].
    ///
    /// # Errors
    ///
    /// Returns [`TourError::OddVertexCount`] if the odd set has odd size
    /// and [`TourError::IncompleteMatching`] if the exact solver leaves a
    /// vertex unmatched.
    pub fn match_odd(self) -> Result<Matched<'a>, TourError> {
        let matching = self.matching.perfect_matching(&self.odd, self.matrix)?;
        debug!(
            "match_odd: {} {} pairs, weight {:.6}",
            matching.len(),
            matching.kind,
            matching.weight(self.matrix)
        );
        Ok(Matched {
            matrix: self.matrix,
            tree: self.tree,
            odd: self.odd,
            matching,
        })
    }
}

// ───────────────────────── Stage 3: Matched ──────────────────────────

/// Pipeline state after matching the odd-degree vertices.
///
/// Call [`assemble`](Self::assemble) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .assemble() to continue"]
pub struct Matched<'a> {
    matrix: &'a AdjacencyMatrix,
    tree: SpanningTree,
    odd: Vec<usize>,
    matching: Matching,
}

impl<'a> Matched<'a> {
    /// The perfect matching on the odd vertices.
    #[must_use]
    pub const fn matching(&self) -> &Matching {
        &self.matching
    }

    /// Combine tree and matching into a multigraph and advance to
    /// [`Assembled`].
    pub fn assemble(self) -> Assembled<'a> {
        let multigraph = Multigraph::assemble(self.matrix.len(), &self.tree, &self.matching);
        debug!(
            "assemble: {} edges, max degree {}",
            multigraph.edge_count(),
            multigraph.max_degree()
        );
        Assembled {
            matrix: self.matrix,
            tree: self.tree,
            odd: self.odd,
            matching: self.matching,
            multigraph,
        }
    }
}

// ───────────────────────── Stage 4: Assembled ────────────────────────

/// Pipeline state after building the even-degree multigraph.
///
/// Call [`traverse`](Self::traverse) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .traverse() to continue"]
pub struct Assembled<'a> {
    matrix: &'a AdjacencyMatrix,
    tree: SpanningTree,
    odd: Vec<usize>,
    matching: Matching,
    multigraph: Multigraph,
}

impl<'a> Assembled<'a> {
    /// The tree-plus-matching multigraph.
    #[must_use]
    pub const fn multigraph(&self) -> &Multigraph {
        &self.multigraph
    }

    /// Walk an Eulerian circuit and advance to [`Traversed`].
    pub fn traverse(self) -> Traversed<'a> {
        let circuit = eulerian_circuit(&self.multigraph);
        debug!("traverse: circuit of {} vertices", circuit.len());
        Traversed {
            matrix: self.matrix,
            tree: self.tree,
            odd: self.odd,
            matching: self.matching,
            multigraph: self.multigraph,
            circuit,
        }
    }
}

// ───────────────────────── Stage 5: Traversed ────────────────────────

/// Pipeline state after extracting the Eulerian circuit.
///
/// Call [`shortcut`](Self::shortcut) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .shortcut() to continue"]
pub struct Traversed<'a> {
    matrix: &'a AdjacencyMatrix,
    tree: SpanningTree,
    odd: Vec<usize>,
    matching: Matching,
    multigraph: Multigraph,
    circuit: EulerianCircuit,
}

impl<'a> Traversed<'a> {
    /// The Eulerian circuit.
    #[must_use]
    pub const fn circuit(&self) -> &EulerianCircuit {
        &self.circuit
    }

    /// Skip repeated vertices and advance to the final [`Toured`] stage.
    pub fn shortcut(self) -> Toured<'a> {
        let tour = crate::shortcut::shortcut(&self.circuit, self.matrix.len());
        debug!(
            "shortcut: tour of {} vertices, cost {:.6}",
            tour.len(),
            tour.cost(self.matrix)
        );
        Toured {
            matrix: self.matrix,
            tree: self.tree,
            odd: self.odd,
            matching: self.matching,
            multigraph: self.multigraph,
            circuit: self.circuit,
            tour,
        }
    }
}

// ───────────────────────── Stage 6: Toured ───────────────────────────

/// Pipeline state after shortcutting: the final stage.
///
/// Call [`into_result`](Self::into_result) to extract the
/// [`StagedTour`] containing all intermediates, or
/// [`into_tour`](Self::into_tour) for the tour alone.
#[must_use = "call .into_result() to extract the StagedTour"]
pub struct Toured<'a> {
    matrix: &'a AdjacencyMatrix,
    tree: SpanningTree,
    odd: Vec<usize>,
    matching: Matching,
    multigraph: Multigraph,
    circuit: EulerianCircuit,
    tour: Tour,
}

impl Toured<'_> {
    /// The Hamiltonian tour.
    #[must_use]
    pub const fn tour(&self) -> &Tour {
        &self.tour
    }

    /// Consume the pipeline and return only the tour.
    #[must_use]
    pub fn into_tour(self) -> Tour {
        self.tour
    }

    /// Consume the pipeline and return the full [`StagedTour`].
    #[must_use]
    pub fn into_result(self) -> StagedTour {
        StagedTour {
            tree: self.tree,
            odd: self.odd,
            matching: self.matching,
            multigraph: self.multigraph,
            circuit: self.circuit,
            tour: self.tour,
        }
    }
}

// ──────────────────── PipelineStage trait + Stage enum ────────────────

/// Total number of stages in the pipeline.
pub const STAGE_COUNT: usize = 7;

/// The output produced by a single pipeline stage.
///
/// Each variant borrows the data that the corresponding stage computed.
#[must_use]
pub enum StageOutput<'s> {
    /// The input matrix (nothing computed yet).
    Source {
        /// The borrowed matrix.
        matrix: &'s AdjacencyMatrix,
    },
    /// Minimum spanning tree.
    Spanned {
        /// The tree.
        tree: &'s SpanningTree,
    },
    /// Odd-degree vertices.
    OddFound {
        /// Ascending vertex indices.
        odd: &'s [usize],
    },
    /// Perfect matching.
    Matched {
        /// The matching.
        matching: &'s Matching,
    },
    /// Tree-plus-matching multigraph.
    Assembled {
        /// The multigraph.
        multigraph: &'s Multigraph,
    },
    /// Eulerian circuit.
    Traversed {
        /// The circuit.
        circuit: &'s EulerianCircuit,
    },
    /// Final tour.
    Toured {
        /// The tour.
        tour: &'s Tour,
    },
}

/// Trait implemented by every pipeline stage, enabling uniform iteration.
///
/// Each stage struct implements it, and [`Stage`] delegates to whichever
/// variant it holds.
///
/// # Loop pattern
///
/// ```rust
/// # use christofides_pipeline::{AdjacencyMatrix, MatchingKind, Pipeline, TourError};
/// # use christofides_pipeline::pipeline::{Advance, Stage};
/// # fn run(matrix: &AdjacencyMatrix) -> Result<(), TourError> {
/// let mut stage: Stage<'_> = Pipeline::new(matrix, MatchingKind::Exact).into();
/// loop {
///     match stage.advance()? {
///         Advance::Next(next) => stage = next,
///         Advance::Complete(done) => { stage = done; break; }
///     }
/// }
/// let result = stage.complete()?;
/// # Ok(())
/// # }
/// ```
pub trait PipelineStage<'a>: Sized {
    /// Human-readable name of this stage (e.g. `"source"`, `"match"`).
    const NAME: &'static str;

    /// Zero-based index of this stage (`0` for Pending through `6` for
    /// Toured).
    const INDEX: usize;

    /// The output this stage produced.
    fn output(&self) -> StageOutput<'_>;

    /// Stage-specific metrics for diagnostics.
    ///
    /// Returns `None` for the initial [`Pending`] stage, which has not
    /// done any work yet.
    fn metrics(&self) -> Option<StageMetrics>;

    /// Advance to the next stage.
    ///
    /// Returns `Ok(Some(stage))` on success, `Ok(None)` if already at
    /// the final stage, or `Err` if the stage transition fails.
    ///
    /// # Errors
    ///
    /// Returns [`TourError`] if the matching stage fails.
    fn next(self) -> Result<Option<Stage<'a>>, TourError>;

    /// Run all remaining stages to completion and return the final
    /// [`StagedTour`].
    ///
    /// # Errors
    ///
    /// Returns [`TourError`] if the matching stage fails.
    fn complete(self) -> Result<StagedTour, TourError>;
}

impl<'a> PipelineStage<'a> for Pending<'a> {
    const NAME: &'static str = "source";
    const INDEX: usize = 0;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Source {
            matrix: self.matrix,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        None
    }

    fn next(self) -> Result<Option<Stage<'a>>, TourError> {
        Ok(Some(Stage::Spanned(self.span())))
    }

    fn complete(self) -> Result<StagedTour, TourError> {
        self.span().complete()
    }
}

impl<'a> PipelineStage<'a> for Spanned<'a> {
    const NAME: &'static str = "span";
    const INDEX: usize = 1;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Spanned { tree: &self.tree }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Span {
            vertex_count: self.matrix.len(),
            edge_count: self.tree.len(),
            total_weight: self.tree.total_weight,
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, TourError> {
        Ok(Some(Stage::OddFound(self.find_odd())))
    }

    fn complete(self) -> Result<StagedTour, TourError> {
        self.find_odd().complete()
    }
}

impl<'a> PipelineStage<'a> for OddFound<'a> {
    const NAME: &'static str = "odd";
    const INDEX: usize = 2;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::OddFound { odd: &self.odd }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::OddVertices {
            odd_count: self.odd.len(),
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, TourError> {
        Ok(Some(Stage::Matched(self.match_odd()?)))
    }

    fn complete(self) -> Result<StagedTour, TourError> {
        self.match_odd()?.complete()
    }
}

impl<'a> PipelineStage<'a> for Matched<'a> {
    const NAME: &'static str = "match";
    const INDEX: usize = 3;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Matched {
            matching: &self.matching,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Match {
            kind: self.matching.kind,
            pair_count: self.matching.len(),
            weight: self.matching.weight(self.matrix),
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, TourError> {
        Ok(Some(Stage::Assembled(self.assemble())))
    }

    fn complete(self) -> Result<StagedTour, TourError> {
        self.assemble().complete()
    }
}

impl<'a> PipelineStage<'a> for Assembled<'a> {
    const NAME: &'static str = "assemble";
    const INDEX: usize = 4;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Assembled {
            multigraph: &self.multigraph,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Assemble {
            edge_count: self.multigraph.edge_count(),
            max_degree: self.multigraph.max_degree(),
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, TourError> {
        Ok(Some(Stage::Traversed(self.traverse())))
    }

    fn complete(self) -> Result<StagedTour, TourError> {
        self.traverse().complete()
    }
}

impl<'a> PipelineStage<'a> for Traversed<'a> {
    const NAME: &'static str = "traverse";
    const INDEX: usize = 5;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Traversed {
            circuit: &self.circuit,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Traverse {
            circuit_len: self.circuit.len(),
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, TourError> {
        Ok(Some(Stage::Toured(self.shortcut())))
    }

    fn complete(self) -> Result<StagedTour, TourError> {
        self.shortcut().complete()
    }
}

impl<'a> PipelineStage<'a> for Toured<'a> {
    const NAME: &'static str = "shortcut";
    const INDEX: usize = 6;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Toured { tour: &self.tour }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Shortcut {
            tour_len: self.tour.len(),
            cost: self.tour.cost(self.matrix),
            complete: self.tour.is_complete(self.matrix.len()),
        })
    }

    fn next(self) -> Result<Option<Stage<'a>>, TourError> {
        Ok(None)
    }

    fn complete(self) -> Result<StagedTour, TourError> {
        Ok(self.into_result())
    }
}

/// Enum wrapping all pipeline stages for uniform, loopable access.
///
/// Use [`From`] conversions to enter the dynamic API from any typed
/// stage, then call [`advance`](Self::advance) in a loop.
#[must_use]
pub enum Stage<'a> {
    /// See [`Pending`].
    Pending(Pending<'a>),
    /// See [`Spanned`].
    Spanned(Spanned<'a>),
    /// See [`OddFound`].
    OddFound(OddFound<'a>),
    /// See [`Matched`].
    Matched(Matched<'a>),
    /// See [`Assembled`].
    Assembled(Assembled<'a>),
    /// See [`Traversed`].
    Traversed(Traversed<'a>),
    /// See [`Toured`].
    Toured(Toured<'a>),
}

/// Compile-time guard: adding a [`Stage`] variant makes this match
/// non-exhaustive until [`STAGE_COUNT`] is revisited.
#[allow(dead_code, clippy::match_same_arms)]
const fn _stage_count_guard(s: &Stage<'_>) {
    match s {
        Stage::Pending(_)
        | Stage::Spanned(_)
        | Stage::OddFound(_)
        | Stage::Matched(_)
        | Stage::Assembled(_)
        | Stage::Traversed(_)
        | Stage::Toured(_) => {}
    }
}

/// Result of [`Stage::advance`]: either the next stage or the
/// completed final stage returned unchanged.
#[must_use]
pub enum Advance<'a> {
    /// The pipeline advanced to this next stage.
    Next(Stage<'a>),
    /// The pipeline was already at the final stage; returned unchanged.
    Complete(Stage<'a>),
}

/// Delegate a method call to whichever `Stage` variant is active.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            Self::Pending(s) => s.$method($($arg),*),
            Self::Spanned(s) => s.$method($($arg),*),
            Self::OddFound(s) => s.$method($($arg),*),
            Self::Matched(s) => s.$method($($arg),*),
            Self::Assembled(s) => s.$method($($arg),*),
            Self::Traversed(s) => s.$method($($arg),*),
            Self::Toured(s) => s.$method($($arg),*),
        }
    };
}

impl<'a> Stage<'a> {
    /// Human-readable name of the current stage.
    #[must_use]
    pub fn name(&self) -> &'static str {
        delegate!(self, name)
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub fn index(&self) -> usize {
        delegate!(self, index)
    }

    /// The output this stage produced.
    pub fn output(&self) -> StageOutput<'_> {
        delegate!(self, output)
    }

    /// Stage-specific metrics for diagnostics.
    #[must_use]
    pub fn metrics(&self) -> Option<StageMetrics> {
        delegate!(self, metrics)
    }

    /// Whether the pipeline is at the final stage.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Toured(_))
    }

    /// Advance to the next stage.
    ///
    /// Returns `Ok(None)` if already complete (the final stage is
    /// consumed).
    ///
    /// # Errors
    ///
    /// Returns [`TourError`] if the matching stage fails.
    pub fn next(self) -> Result<Option<Self>, TourError> {
        delegate!(self, next)
    }

    /// Advance to the next stage, returning `self` unchanged if
    /// already complete.
    ///
    /// # Errors
    ///
    /// Returns [`TourError`] if the matching stage fails.
    pub fn advance(self) -> Result<Advance<'a>, TourError> {
        if self.is_complete() {
            return Ok(Advance::Complete(self));
        }
        // Non-complete stages always return Ok(Some(_)) from next().
        #[allow(clippy::unreachable)]
        let next = self
            .next()?
            .unwrap_or_else(|| unreachable!("non-complete stage returned None from next()"));
        Ok(Advance::Next(next))
    }

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`TourError`] if the matching stage fails.
    pub fn complete(self) -> Result<StagedTour, TourError> {
        delegate!(self, complete)
    }
}

// Lets the macro call `.name()` and `.index()` on `&self`; associated
// constants aren't reachable as `self.NAME`.
trait StageMetadata {
    fn name(&self) -> &'static str;
    fn index(&self) -> usize;
}

impl<'a, T: PipelineStage<'a>> StageMetadata for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn index(&self) -> usize {
        T::INDEX
    }
}

impl<'a> From<Pending<'a>> for Stage<'a> {
    fn from(s: Pending<'a>) -> Self {
        Self::Pending(s)
    }
}

impl<'a> From<Spanned<'a>> for Stage<'a> {
    fn from(s: Spanned<'a>) -> Self {
        Self::Spanned(s)
    }
}

impl<'a> From<OddFound<'a>> for Stage<'a> {
    fn from(s: OddFound<'a>) -> Self {
        Self::OddFound(s)
    }
}

impl<'a> From<Matched<'a>> for Stage<'a> {
    fn from(s: Matched<'a>) -> Self {
        Self::Matched(s)
    }
}

impl<'a> From<Assembled<'a>> for Stage<'a> {
    fn from(s: Assembled<'a>) -> Self {
        Self::Assembled(s)
    }
}

impl<'a> From<Traversed<'a>> for Stage<'a> {
    fn from(s: Traversed<'a>) -> Self {
        Self::Traversed(s)
    }
}

impl<'a> From<Toured<'a>> for Stage<'a> {
    fn from(s: Toured<'a>) -> Self {
        Self::Toured(s)
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental Christofides pipeline.
///
/// Created via [`Pipeline::new`], which borrows the matrix without doing
/// any work. Each stage method consumes the current state and returns the
/// next, making it a compile-time error to skip stages or call them out
/// of order.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline over `matrix` using the given matching engine.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(matrix: &AdjacencyMatrix, matching: MatchingKind) -> Pending<'_> {
        Pending { matrix, matching }
    }
}
