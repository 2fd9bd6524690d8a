//! Perfect matching on the odd-degree vertices of the spanning tree.
//!
//! Two engines are available through [`MatchingKind`]:
//!
//! - [`MatchingKind::Greedy`] pairs each vertex with its nearest later
//!   unmatched neighbour. Cheap and always valid, but the result is not
//!   minimum and the tour loses its 3/2 approximation guarantee.
//! - [`MatchingKind::Exact`] finds a minimum-weight perfect matching.
//!
//! # Exact engine
//!
//! Odd sets of up to 16 vertices are solved by a subset DP over the real
//! `f64` weights, which is exact.
//!
//! Larger sets go to the blossom solver in the [`mwmatching`] crate,
//! which maximizes integer weight among maximum-cardinality matchings.
//! Weights are quantized to `q(w) = round(w / w_max * 2^27)` and
//! complemented to `2^27 - q(w) + 1`. On a complete graph with an even
//! vertex count every maximum-cardinality matching is perfect, so the
//! solver returns a minimum for the *quantized* weights. Weights closer
//! than one grid step (`w_max / 2^27`) are indistinguishable to it, so
//! its answer is then repaired on the real weights: any two pairs are
//! re-paired while that is strictly lighter, and the greedy matching is
//! kept instead if it is still lighter.

use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::types::{AdjacencyMatrix, TourError};

/// Largest odd set the exact engine solves by subset DP.
const SUBSET_DP_MAX_VERTICES: usize = 16;

/// Integer grid the blossom solver's weights are quantized onto. The
/// solver doubles weights and adds vertex and blossom duals in `i32`, so
/// the grid stays well below `i32::MAX / 4`.
const QUANTIZATION_SCALE: i32 = 1 << 27;

/// Relative saving a re-pairing must reach to be applied.
const SWAP_EPSILON: f64 = 1e-12;

/// Upper bound on re-pairing passes over the blossom solver's answer.
const SWAP_MAX_PASSES: usize = 64;

/// Selects which perfect-matching engine fixes odd-degree vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchingKind {
    /// Nearest-later-neighbour greedy pairing, `O(k²)`.
    ///
    /// Valid but not minimum: tours built with it have no 3/2 bound.
    Greedy,

    /// Minimum-weight perfect matching: subset DP for small odd sets,
    /// the blossom algorithm above that.
    #[default]
    Exact,
}

impl MatchingKind {
    /// Every engine, in declaration order.
    pub const ALL: [Self; 2] = [Self::Greedy, Self::Exact];

    /// Whether tours built on this matching keep the 3/2 approximation
    /// guarantee.
    #[must_use]
    pub const fn preserves_bound(self) -> bool {
        matches!(self, Self::Exact)
    }
}

impl fmt::Display for MatchingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Greedy => f.write_str("greedy"),
            Self::Exact => f.write_str("exact"),
        }
    }
}

/// A perfect matching on a set of odd-degree vertices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Matching {
    /// The engine that produced the pairs.
    pub kind: MatchingKind,
    /// Matched vertex pairs, in original graph indices.
    pub pairs: Vec<(usize, usize)>,
}

impl Matching {
    /// Number of matched pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if no pairs were matched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sum of the matched edge weights.
    #[must_use]
    pub fn weight(&self, matrix: &AdjacencyMatrix) -> f64 {
        pair_weight(&self.pairs, matrix)
    }
}

/// Trait for perfect-matching engines.
///
/// Input: an even-sized set of distinct vertices of the matrix.
/// Output: pairs covering every input vertex exactly once.
pub trait PerfectMatcher {
    /// Pair up every vertex in `odd`.
    ///
    /// # Errors
    ///
    /// Returns [`TourError::OddVertexCount`] if `odd.len()` is odd,
    /// [`TourError::DimensionMismatch`] if a vertex lies outside the
    /// matrix, [`TourError::NonFiniteWeight`] if two of the vertices are
    /// joined by a NaN or infinite weight, and
    /// [`TourError::IncompleteMatching`] if the engine leaves a vertex
    /// unmatched.
    fn perfect_matching(
        &self,
        odd: &[usize],
        matrix: &AdjacencyMatrix,
    ) -> Result<Matching, TourError>;
}

impl PerfectMatcher for MatchingKind {
    fn perfect_matching(
        &self,
        odd: &[usize],
        matrix: &AdjacencyMatrix,
    ) -> Result<Matching, TourError> {
        check_input(odd, matrix)?;
        let pairs = match *self {
            Self::Greedy => greedy_pairs(odd, matrix),
            Self::Exact => exact_pairs(odd, matrix)?,
        };
        Ok(Matching { kind: *self, pairs })
    }
}

fn check_input(odd: &[usize], matrix: &AdjacencyMatrix) -> Result<(), TourError> {
    if odd.len() % 2 == 1 {
        return Err(TourError::OddVertexCount(odd.len()));
    }
    if let Some(&v) = odd.iter().find(|&&v| v >= matrix.len()) {
        return Err(TourError::DimensionMismatch {
            expected: matrix.len(),
            actual: v,
        });
    }
    for (i, &a) in odd.iter().enumerate() {
        if let Some(&b) = odd[i + 1..]
            .iter()
            .find(|&&b| !matrix.weight(a, b).is_finite())
        {
            return Err(TourError::NonFiniteWeight { src: a, dst: b });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Greedy
// ---------------------------------------------------------------------------

/// Pair each unmatched vertex with the nearest unmatched vertex after it.
///
/// Strict `<` comparison: on ties the earliest candidate wins.
fn greedy_pairs(odd: &[usize], matrix: &AdjacencyMatrix) -> Vec<(usize, usize)> {
    let k = odd.len();
    let mut matched = vec![false; k];
    let mut pairs = Vec::with_capacity(k / 2);

    for i in 0..k {
        if matched[i] {
            continue;
        }
        let mut best: Option<(usize, f64)> = None;
        for j in (i + 1)..k {
            if matched[j] {
                continue;
            }
            let w = matrix.weight(odd[i], odd[j]);
            if best.is_none_or(|(_, best_w)| w < best_w) {
                best = Some((j, w));
            }
        }
        if let Some((j, _)) = best {
            matched[i] = true;
            matched[j] = true;
            pairs.push((odd[i], odd[j]));
        }
    }

    pairs
}

// ---------------------------------------------------------------------------
// Exact
// ---------------------------------------------------------------------------

/// Minimum-weight perfect matching: subset DP for small sets, the
/// repaired blossom solver otherwise.
fn exact_pairs(
    odd: &[usize],
    matrix: &AdjacencyMatrix,
) -> Result<Vec<(usize, usize)>, TourError> {
    match odd.len() {
        0 => Ok(Vec::new()),
        k if k <= SUBSET_DP_MAX_VERTICES => Ok(subset_dp_pairs(odd, matrix)),
        _ => blossom_pairs(odd, matrix),
    }
}

/// Exact minimum-weight perfect matching by DP over matched subsets.
///
/// `best[mask]` is the lightest way to match exactly the vertices in
/// `mask`; each step matches the lowest unmatched vertex. `O(2^k k)`.
fn subset_dp_pairs(odd: &[usize], matrix: &AdjacencyMatrix) -> Vec<(usize, usize)> {
    let k = odd.len();
    let full = (1_usize << k) - 1;
    let mut best = vec![f64::INFINITY; full + 1];
    let mut last_pair = vec![(0_usize, 0_usize); full + 1];
    best[0] = 0.0;

    for mask in 0..full {
        let base = best[mask];
        if base.is_infinite() {
            continue;
        }
        let i = (!mask).trailing_zeros() as usize;
        for j in (i + 1)..k {
            if mask & (1 << j) != 0 {
                continue;
            }
            let next = mask | (1 << i) | (1 << j);
            let w = base + matrix.weight(odd[i], odd[j]);
            if w < best[next] {
                best[next] = w;
                last_pair[next] = (i, j);
            }
        }
    }

    let mut pairs = Vec::with_capacity(k / 2);
    let mut mask = full;
    while mask != 0 {
        let (i, j) = last_pair[mask];
        pairs.push((odd[i], odd[j]));
        mask &= !((1 << i) | (1 << j));
    }
    pairs.reverse();
    pairs
}

/// Blossom solver on quantized weights, repaired on the real weights.
fn blossom_pairs(
    odd: &[usize],
    matrix: &AdjacencyMatrix,
) -> Result<Vec<(usize, usize)>, TourError> {
    let mut pairs = solve_quantized(odd, matrix)?;
    refine_by_swaps(&mut pairs, matrix);

    let greedy = greedy_pairs(odd, matrix);
    if pair_weight(&greedy, matrix) < pair_weight(&pairs, matrix) {
        warn!(
            "blossom matching on {} vertices is heavier than greedy after repair; keeping greedy",
            odd.len()
        );
        pairs = greedy;
    }

    for pair in &mut pairs {
        if pair.0 > pair.1 {
            *pair = (pair.1, pair.0);
        }
    }
    pairs.sort_unstable();
    Ok(pairs)
}

fn solve_quantized(
    odd: &[usize],
    matrix: &AdjacencyMatrix,
) -> Result<Vec<(usize, usize)>, TourError> {
    let k = odd.len();
    let max_weight = odd
        .iter()
        .enumerate()
        .flat_map(|(i, &a)| odd[i + 1..].iter().map(move |&b| (a, b)))
        .map(|(a, b)| matrix.weight(a, b))
        .fold(0.0_f64, f64::max);

    let mut edges = Vec::with_capacity(k * (k - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            let q = quantize(matrix.weight(odd[i], odd[j]), max_weight);
            edges.push((i, j, QUANTIZATION_SCALE - q + 1));
        }
    }

    let mate = mwmatching::Matching::new(edges).max_cardinality().solve();

    let mut pairs = Vec::with_capacity(k / 2);
    for (i, &vertex) in odd.iter().enumerate() {
        match mate.get(i).copied() {
            Some(j) if j != mwmatching::SENTINEL && j < k => {
                if i < j {
                    pairs.push((vertex, odd[j]));
                }
            }
            _ => return Err(TourError::IncompleteMatching { vertex }),
        }
    }

    Ok(pairs)
}

/// Re-pair `(a, b), (c, d)` as `(a, c), (b, d)` or `(a, d), (b, c)`
/// whenever that is strictly lighter, until no such swap remains.
fn refine_by_swaps(pairs: &mut [(usize, usize)], matrix: &AdjacencyMatrix) {
    let w = |a: usize, b: usize| matrix.weight(a, b);
    let mut swaps = 0_usize;
    for _ in 0..SWAP_MAX_PASSES {
        let mut improved = false;
        for p in 0..pairs.len() {
            for q in (p + 1)..pairs.len() {
                let (a, b) = pairs[p];
                let (c, d) = pairs[q];
                let current = w(a, b) + w(c, d);
                let cross = w(a, c) + w(b, d);
                let twist = w(a, d) + w(b, c);
                let threshold = current - SWAP_EPSILON * current.max(1.0);
                if cross <= twist && cross < threshold {
                    pairs[p] = (a, c);
                    pairs[q] = (b, d);
                    improved = true;
                    swaps += 1;
                } else if twist < threshold {
                    pairs[p] = (a, d);
                    pairs[q] = (b, c);
                    improved = true;
                    swaps += 1;
                }
            }
        }
        if !improved {
            break;
        }
    }
    if swaps > 0 {
        debug!("repaired blossom matching with {swaps} re-pairing(s)");
    }
}

fn pair_weight(pairs: &[(usize, usize)], matrix: &AdjacencyMatrix) -> f64 {
    pairs.iter().map(|&(a, b)| matrix.weight(a, b)).sum()
}

/// Map `weight` onto `0..=QUANTIZATION_SCALE` relative to `max_weight`.
///
/// Weights are finite here; a zero `max_weight` maps everything to 0.
#[allow(clippy::cast_possible_truncation)]
fn quantize(weight: f64, max_weight: f64) -> i32 {
    if max_weight <= 0.0 {
        return 0;
    }
    let scale = f64::from(QUANTIZATION_SCALE);
    (weight / max_weight * scale).round().clamp(0.0, scale) as i32
}
