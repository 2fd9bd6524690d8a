//! Tour construction strategies: the [`TourBuilder`] trait for pluggable
//! heuristics and the [`TourStrategyKind`] enum for runtime selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{AdjacencyMatrix, Tour, TourConfig, TourError};

/// Selects which tour construction heuristic to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TourStrategyKind {
    /// MST + minimum perfect matching on odd vertices + Eulerian
    /// shortcut. Within 3/2 of optimal on metric inputs when the exact
    /// matching engine is used.
    #[default]
    Christofides,

    /// Depth-first preorder of the MST. Within 2 of optimal on metric
    /// inputs.
    DoubleTree,

    /// 2-opt local search from the identity tour. No worst-case bound.
    TwoOpt,
}

impl TourStrategyKind {
    /// Every strategy, in alphabetical order.
    pub const ALL: [Self; 3] = [Self::Christofides, Self::DoubleTree, Self::TwoOpt];
}

impl fmt::Display for TourStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Christofides => f.write_str("christofides"),
            Self::DoubleTree => f.write_str("double-tree"),
            Self::TwoOpt => f.write_str("two-opt"),
        }
    }
}

/// Trait for tour construction strategies.
///
/// Input: a complete symmetric matrix and the run configuration.
/// Output: a tour visiting every vertex once.
pub trait TourBuilder {
    /// Build a tour over every vertex of `matrix`.
    ///
    /// # Errors
    ///
    /// Returns [`TourError`] if the strategy's internal stages fail (only
    /// the Christofides matching stage can).
    fn build_tour(&self, matrix: &AdjacencyMatrix, config: &TourConfig)
    -> Result<Tour, TourError>;
}

impl TourBuilder for TourStrategyKind {
    fn build_tour(
        &self,
        matrix: &AdjacencyMatrix,
        config: &TourConfig,
    ) -> Result<Tour, TourError> {
        match *self {
            Self::Christofides => crate::christofides(matrix, config.matching),
            Self::DoubleTree => Ok(crate::double_tree::double_tree(matrix)),
            Self::TwoOpt => Ok(crate::two_opt::two_opt(
                matrix,
                config.two_opt_max_passes,
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn four_cycle() -> AdjacencyMatrix {
        AdjacencyMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0, 1.0],
            vec![1.0, 0.0, 1.0, 2.0],
            vec![2.0, 1.0, 0.0, 1.0],
            vec![1.0, 2.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn default_is_christofides() {
        assert_eq!(TourStrategyKind::default(), TourStrategyKind::Christofides);
    }

    #[test]
    fn display_matches_serde_names() {
        for kind in TourStrategyKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn all_is_sorted_by_name() {
        let names: Vec<String> = TourStrategyKind::ALL.iter().map(ToString::to_string).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn every_strategy_solves_four_cycle() {
        let m = four_cycle();
        for kind in TourStrategyKind::ALL {
            let config = TourConfig {
                strategy: kind,
                ..TourConfig::default()
            };
            let tour = kind.build_tour(&m, &config).unwrap();
            assert!(tour.is_complete(4), "{kind} should visit every vertex");
            assert!(
                (tour.cost(&m) - 4.0).abs() < 1e-12,
                "{kind} should find the optimal 4-cycle"
            );
        }
    }
}
