//! Property tests over random instances.
//!
//! Instances are seeded so failures reproduce. Euclidean instances are
//! metric, which is what the approximation bounds assume.

#![allow(clippy::unwrap_used)]

use christofides_pipeline::{
    AdjacencyMatrix, MatchingKind, PerfectMatcher, Tour, TourConfig, TourStrategyKind, build_tour,
    christofides, kruskal, odd_degree_vertices, process_staged,
};
use petgraph::algo::min_spanning_tree;
use petgraph::data::Element;
use petgraph::graph::UnGraph;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn euclidean(rng: &mut StdRng, n: usize) -> AdjacencyMatrix {
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
        .collect();
    AdjacencyMatrix::from_fn(n, |i, j| {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        (xi - xj).hypot(yi - yj)
    })
}

/// Random symmetric weights, not necessarily metric.
fn random_symmetric(rng: &mut StdRng, n: usize) -> AdjacencyMatrix {
    let mut weights = vec![0.0; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let w: f64 = rng.gen_range(1.0..50.0);
            weights[i * n + j] = w;
            weights[j * n + i] = w;
        }
    }
    AdjacencyMatrix::new(n, weights).unwrap()
}

fn relabel(matrix: &AdjacencyMatrix, perm: &[usize]) -> AdjacencyMatrix {
    AdjacencyMatrix::from_fn(matrix.len(), |i, j| matrix.weight(perm[i], perm[j]))
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn extend(prefix: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
        if prefix.len() == used.len() {
            out.push(prefix.clone());
            return;
        }
        for v in 0..used.len() {
            if !used[v] {
                used[v] = true;
                prefix.push(v);
                extend(prefix, used, out);
                prefix.pop();
                used[v] = false;
            }
        }
    }
    let mut out = Vec::new();
    extend(&mut Vec::with_capacity(n), &mut vec![false; n], &mut out);
    out
}

/// Optimal tour cost by enumerating every tour that starts at vertex 0.
fn brute_force_optimum(matrix: &AdjacencyMatrix) -> f64 {
    let n = matrix.len();
    if n <= 1 {
        return 0.0;
    }
    permutations(n - 1)
        .into_iter()
        .map(|rest| {
            let mut order = vec![0];
            order.extend(rest.into_iter().map(|v| v + 1));
            Tour::new(order).cost(matrix)
        })
        .fold(f64::INFINITY, f64::min)
}

fn reference_mst_weight(matrix: &AdjacencyMatrix) -> f64 {
    let n = matrix.len();
    let mut graph = UnGraph::<(), f64>::with_capacity(n, n * n / 2);
    let nodes: Vec<_> = (0..n).map(|_| graph.add_node(())).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            graph.add_edge(nodes[i], nodes[j], matrix.weight(i, j));
        }
    }
    min_spanning_tree(&graph)
        .filter_map(|element| match element {
            Element::Edge { weight, .. } => Some(weight),
            Element::Node { .. } => None,
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Spanning tree
// ---------------------------------------------------------------------------

#[test]
fn mst_matches_reference_weight() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in 0..25 {
        let m = random_symmetric(&mut rng, n);
        let tree = kruskal(&m);
        assert_eq!(tree.len(), n.saturating_sub(1), "edge count for n={n}");
        let reference = reference_mst_weight(&m);
        assert!(
            (tree.total_weight - reference).abs() < 1e-9,
            "n={n}: {} vs reference {reference}",
            tree.total_weight
        );
    }
}

#[test]
fn mst_weight_is_relabeling_invariant() {
    let mut rng = StdRng::seed_from_u64(11);
    for n in [5, 9, 16] {
        let m = random_symmetric(&mut rng, n);
        let mut perm: Vec<usize> = (0..n).collect();
        perm.reverse();
        perm.rotate_left(n / 3);
        let relabeled = relabel(&m, &perm);
        assert!((kruskal(&m).total_weight - kruskal(&relabeled).total_weight).abs() < 1e-9);
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[test]
fn both_engines_cover_odd_vertices_once() {
    let mut rng = StdRng::seed_from_u64(3);
    for n in 2..30 {
        let m = euclidean(&mut rng, n);
        let odd = odd_degree_vertices(n, &kruskal(&m).edges);
        for kind in MatchingKind::ALL {
            let matching = kind.perfect_matching(&odd, &m).unwrap();
            let mut covered: Vec<usize> =
                matching.pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
            covered.sort_unstable();
            assert_eq!(covered, odd, "{kind} matching on n={n}");
        }
    }
}

#[test]
fn exact_matching_never_heavier_than_greedy() {
    let mut rng = StdRng::seed_from_u64(5);
    for n in 2..40 {
        let m = euclidean(&mut rng, n);
        let odd = odd_degree_vertices(n, &kruskal(&m).edges);
        let exact = MatchingKind::Exact.perfect_matching(&odd, &m).unwrap();
        let greedy = MatchingKind::Greedy.perfect_matching(&odd, &m).unwrap();
        assert!(
            exact.weight(&m) <= greedy.weight(&m) + 1e-9,
            "n={n}: exact {} > greedy {}",
            exact.weight(&m),
            greedy.weight(&m)
        );
    }
}

/// Euclidean points with a few of them shifted `far` along the x axis.
fn euclidean_with_far_cluster(rng: &mut StdRng, n: usize, far: f64) -> AdjacencyMatrix {
    let points: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let x: f64 = rng.gen_range(0.0..10.0);
            let y: f64 = rng.gen_range(0.0..10.0);
            if i % 4 == 3 { (x + far, y) } else { (x, y) }
        })
        .collect();
    AdjacencyMatrix::from_fn(n, |i, j| {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        (xi - xj).hypot(yi - yj)
    })
}

fn brute_force_matching_weight(odd: &[usize], matrix: &AdjacencyMatrix) -> f64 {
    let Some((&first, rest)) = odd.split_first() else {
        return 0.0;
    };
    (0..rest.len())
        .map(|p| {
            let mut remaining = rest.to_vec();
            let partner = remaining.remove(p);
            matrix.weight(first, partner) + brute_force_matching_weight(&remaining, matrix)
        })
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn exact_matching_is_minimum_on_wide_weight_ranges() {
    let mut rng = StdRng::seed_from_u64(6);
    for far in [1e4, 1e7, 1e9] {
        for n in 4..14 {
            let m = euclidean_with_far_cluster(&mut rng, n, far);
            let odd = odd_degree_vertices(n, &kruskal(&m).edges);
            let exact = MatchingKind::Exact.perfect_matching(&odd, &m).unwrap();
            let greedy = MatchingKind::Greedy.perfect_matching(&odd, &m).unwrap();
            let optimum = brute_force_matching_weight(&odd, &m);
            assert!(
                (exact.weight(&m) - optimum).abs() <= 1e-9 * optimum.max(1.0),
                "far={far} n={n}: exact {} vs optimum {optimum}",
                exact.weight(&m)
            );
            assert!(exact.weight(&m) <= greedy.weight(&m) + 1e-9 * optimum.max(1.0));
        }
    }
}

#[test]
fn exact_matching_is_minimum_on_line_with_far_pair() {
    let odd: Vec<usize> = (0..6).collect();
    for far in [1e7_f64, 1e9] {
        let positions = [0.0, 3.0, 1.0, 4.4, far, far + 1.0];
        let m = AdjacencyMatrix::from_fn(6, |i, j| (positions[i] - positions[j]).abs());
        let exact = MatchingKind::Exact.perfect_matching(&odd, &m).unwrap();
        let greedy = MatchingKind::Greedy.perfect_matching(&odd, &m).unwrap();
        assert!((exact.weight(&m) - 3.4).abs() < 1e-6, "far={far}");
        assert!(exact.weight(&m) <= greedy.weight(&m));
    }
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

#[test]
fn every_strategy_returns_a_permutation() {
    let mut rng = StdRng::seed_from_u64(1);
    for n in 0..30 {
        let m = euclidean(&mut rng, n);
        for strategy in TourStrategyKind::ALL {
            for matching in MatchingKind::ALL {
                let config = TourConfig {
                    strategy,
                    matching,
                    ..TourConfig::default()
                };
                let tour = build_tour(&m, &config).unwrap();
                assert!(
                    tour.is_complete(n),
                    "{strategy}/{matching} on n={n}: {:?}",
                    tour.vertices()
                );
            }
        }
    }
}

#[test]
fn multigraph_is_even_and_circuit_uses_every_edge() {
    let mut rng = StdRng::seed_from_u64(13);
    for n in 2..30 {
        let m = euclidean(&mut rng, n);
        let staged = process_staged(&m, MatchingKind::Exact).unwrap();
        assert!(staged.multigraph.is_even(), "n={n}");

        let circuit = staged.circuit.vertices();
        assert_eq!(circuit.len(), staged.multigraph.edge_count() + 1);
        assert_eq!(circuit.first(), circuit.last());

        let mut remaining = staged.multigraph.adjacency.clone();
        for pair in circuit.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let pos = remaining[a].iter().position(|&u| u == b).unwrap();
            remaining[a].swap_remove(pos);
            let pos = remaining[b].iter().position(|&u| u == a).unwrap();
            remaining[b].swap_remove(pos);
        }
        assert!(remaining.iter().all(Vec::is_empty), "n={n}: unused edges");
    }
}

#[test]
fn exact_christofides_within_three_halves_of_optimum() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in 3..=8 {
        for _ in 0..4 {
            let m = euclidean(&mut rng, n);
            let tour = christofides(&m, MatchingKind::Exact).unwrap();
            let optimum = brute_force_optimum(&m);
            let tolerance = 1e-9 * optimum.max(1.0);
            assert!(
                tour.cost(&m) <= 1.5 * optimum + tolerance,
                "n={n}: {} > 1.5 * {optimum}",
                tour.cost(&m)
            );
        }
    }
}

#[test]
fn double_tree_within_twice_optimum() {
    let mut rng = StdRng::seed_from_u64(17);
    for n in 3..=8 {
        let m = euclidean(&mut rng, n);
        let config = TourConfig {
            strategy: TourStrategyKind::DoubleTree,
            ..TourConfig::default()
        };
        let tour = build_tour(&m, &config).unwrap();
        assert!(tour.cost(&m) <= 2.0 * brute_force_optimum(&m) + 1e-9);
    }
}

#[test]
fn two_opt_never_worse_than_identity() {
    let mut rng = StdRng::seed_from_u64(23);
    for n in 0..25 {
        let m = euclidean(&mut rng, n);
        let identity = Tour::new((0..n).collect());
        let config = TourConfig {
            strategy: TourStrategyKind::TwoOpt,
            ..TourConfig::default()
        };
        let tour = build_tour(&m, &config).unwrap();
        assert!(tour.cost(&m) <= identity.cost(&m) + 1e-9, "n={n}");
    }
}

#[test]
fn four_cycle_cost_is_relabeling_invariant() {
    let cycle = AdjacencyMatrix::from_rows(vec![
        vec![0.0, 1.0, 2.0, 1.0],
        vec![1.0, 0.0, 1.0, 2.0],
        vec![2.0, 1.0, 0.0, 1.0],
        vec![1.0, 2.0, 1.0, 0.0],
    ])
    .unwrap();
    let perms = permutations(4);
    assert_eq!(perms.len(), 24);
    for perm in perms {
        let m = relabel(&cycle, &perm);
        for matching in MatchingKind::ALL {
            let tour = christofides(&m, matching).unwrap();
            assert!(
                (tour.cost(&m) - 4.0).abs() < f64::EPSILON,
                "{matching} under relabeling {perm:?}"
            );
        }
    }
}
