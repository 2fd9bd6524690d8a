//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! Timing is read from an injected [`Clock`] so the crate itself never
//! touches a platform time source. Durations are serialized as
//! fractional seconds (`f64`) for JSON compatibility, since
//! `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::matching::MatchingKind;
use crate::pipeline::{Advance, Pipeline, STAGE_COUNT, Stage};
use crate::types::{AdjacencyMatrix, StagedTour, TourError};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Monotonic time source supplied by the caller.
pub trait Clock {
    /// A point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single Christofides run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// One entry per executed stage, in pipeline order.
    pub stages: Vec<StageDiagnostics>,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary of the finished run.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Stage name (`"span"`, `"odd"`, ...).
    pub name: String,
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Minimum spanning tree metrics.
    Span {
        /// Number of vertices in the input.
        vertex_count: usize,
        /// Number of tree edges.
        edge_count: usize,
        /// Total tree weight (a lower bound on the optimal tour).
        total_weight: f64,
    },
    /// Odd-degree extraction metrics.
    OddVertices {
        /// Number of odd-degree vertices.
        odd_count: usize,
    },
    /// Matching metrics.
    Match {
        /// Engine that produced the matching.
        kind: MatchingKind,
        /// Number of matched pairs.
        pair_count: usize,
        /// Total matched weight.
        weight: f64,
    },
    /// Multigraph metrics.
    Assemble {
        /// Number of edges, parallel edges counted separately.
        edge_count: usize,
        /// Largest vertex degree.
        max_degree: usize,
    },
    /// Eulerian circuit metrics.
    Traverse {
        /// Vertices in the circuit (edges + 1).
        circuit_len: usize,
    },
    /// Shortcut metrics.
    Shortcut {
        /// Vertices in the tour.
        tour_len: usize,
        /// Closed tour cost.
        cost: f64,
        /// Whether the tour visits every vertex exactly once.
        complete: bool,
    },
}

/// High-level summary of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of vertices in the input.
    pub vertex_count: usize,
    /// Matching engine used.
    pub matching: MatchingKind,
    /// Minimum spanning tree weight.
    pub tree_weight: f64,
    /// Closed tour cost.
    pub tour_cost: f64,
    /// Whether the tour visits every vertex exactly once.
    pub complete: bool,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Vertices: {}  |  Matching: {}",
            self.summary.vertex_count, self.summary.matching,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for stage in &self.stages {
            let ms = duration_ms(stage.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&stage.metrics);
            lines.push(format!(
                "{:<24} {ms:>8.3}ms {pct:>9.1}%  {details}",
                stage.name
            ));
        }

        lines.push(String::new());
        let ratio = if self.summary.tree_weight > 0.0 {
            self.summary.tour_cost / self.summary.tree_weight
        } else {
            0.0
        };
        lines.push(format!(
            "Tour cost: {:.6}  |  MST weight: {:.6}  |  ratio: {ratio:.3}{}",
            self.summary.tour_cost,
            self.summary.tree_weight,
            if self.summary.complete {
                ""
            } else {
                "  |  TRUNCATED"
            },
        ));

        lines.join("\n")
    }
}

/// Run every Christofides stage, timing each one with `clock`.
///
/// Drives the dynamic [`Stage`] loop so each transition is timed on its
/// own; metric collection happens outside the timed region.
///
/// # Errors
///
/// Returns [`TourError`] if the matching stage fails.
pub fn process_staged_with_diagnostics<C: Clock>(
    matrix: &AdjacencyMatrix,
    matching: MatchingKind,
    clock: &C,
) -> Result<(StagedTour, PipelineDiagnostics), TourError> {
    let total_start = clock.now();
    let mut stages = Vec::with_capacity(STAGE_COUNT - 1);
    let mut stage: Stage<'_> = Pipeline::new(matrix, matching).into();

    loop {
        let start = clock.now();
        match stage.advance()? {
            Advance::Next(next) => {
                let duration = clock.elapsed(&start);
                if let Some(metrics) = next.metrics() {
                    stages.push(StageDiagnostics {
                        name: next.name().to_string(),
                        duration,
                        metrics,
                    });
                }
                stage = next;
            }
            Advance::Complete(done) => {
                stage = done;
                break;
            }
        }
    }

    let staged = stage.complete()?;
    let total_duration = clock.elapsed(&total_start);

    let summary = PipelineSummary {
        vertex_count: matrix.len(),
        matching,
        tree_weight: staged.tree.total_weight,
        tour_cost: staged.tour.cost(matrix),
        complete: staged.tour.is_complete(matrix.len()),
    };

    Ok((
        staged,
        PipelineDiagnostics {
            stages,
            total_duration,
            summary,
        },
    ))
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Span {
            vertex_count,
            edge_count,
            total_weight,
        } => format!("{vertex_count} vertices -> {edge_count} edges, weight={total_weight:.3}"),
        StageMetrics::OddVertices { odd_count } => format!("{odd_count} odd"),
        StageMetrics::Match {
            kind,
            pair_count,
            weight,
        } => format!("{kind} {pair_count} pairs, weight={weight:.3}"),
        StageMetrics::Assemble {
            edge_count,
            max_degree,
        } => format!("{edge_count} edges, max degree {max_degree}"),
        StageMetrics::Traverse { circuit_len } => format!("{circuit_len} circuit vertices"),
        StageMetrics::Shortcut {
            tour_len,
            cost,
            complete,
        } => {
            let state = if *complete { "complete" } else { "truncated" };
            format!("{tour_len} vertices, cost={cost:.3} ({state})")
        }
    }
}
