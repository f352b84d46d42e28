//! Property-based tests for coreference metric invariants.
//!
//! Partitions are generated by assigning each of `n` mentions a random
//! cluster label, which covers singletons, one big cluster, and everything in
//! between.

use proptest::prelude::*;
use stroll::eval::assignment::max_weight_assignment;
use stroll::eval::{score_partitions, CorefCounts, CorefScores};
use stroll::Partition;

fn partition_from_labels(labels: &[u8]) -> Partition<u32> {
    let mut clusters: std::collections::BTreeMap<u8, Vec<u32>> = Default::default();
    for (mention, &label) in labels.iter().enumerate() {
        clusters.entry(label).or_default().push(mention as u32);
    }
    Partition::new(clusters.into_values()).unwrap()
}

/// Two partitions over the same `n` mentions.
fn aligned_pair() -> impl Strategy<Value = (Partition<u32>, Partition<u32>)> {
    (1..12usize).prop_flat_map(|n| {
        (
            prop::collection::vec(0..6u8, n),
            prop::collection::vec(0..6u8, n),
        )
            .prop_map(|(a, b)| (partition_from_labels(&a), partition_from_labels(&b)))
    })
}

fn in_unit_range(s: &CorefScores) -> bool {
    let ok = |x: f64| (0.0..=1.0 + 1e-9).contains(&x);
    ok(s.precision) && ok(s.recall) && ok(s.f1)
}

/// Exhaustive maximum over all injective row -> column maps.
fn brute_force_max(weights: &[Vec<f64>], cols: usize) -> f64 {
    fn go(weights: &[Vec<f64>], row: usize, used: &mut Vec<bool>, cols: usize) -> f64 {
        if row == weights.len() {
            return 0.0;
        }
        // leaving a row unmatched is allowed when rows > cols
        let mut best = if weights.len() > cols {
            go(weights, row + 1, used, cols)
        } else {
            f64::NEG_INFINITY
        };
        for c in 0..cols {
            if !used[c] {
                used[c] = true;
                best = best.max(weights[row][c] + go(weights, row + 1, used, cols));
                used[c] = false;
            }
        }
        if best == f64::NEG_INFINITY {
            0.0
        } else {
            best
        }
    }
    go(weights, 0, &mut vec![false; cols], cols)
}

proptest! {
    #[test]
    fn identity_scores_one(labels in prop::collection::vec(0..5u8, 1..15)) {
        let p = partition_from_labels(&labels);
        let eval = score_partitions(&p, &p).unwrap();

        prop_assert!((eval.b_cubed.f1 - 1.0).abs() < 1e-9);
        prop_assert!((eval.ceaf_e.f1 - 1.0).abs() < 1e-9);
        if p.singleton_count() < p.len() {
            prop_assert!((eval.muc.f1 - 1.0).abs() < 1e-9);
            prop_assert!((eval.conll_f1() - 1.0).abs() < 1e-9);
        } else {
            prop_assert_eq!(eval.muc.f1, 0.0);
        }
    }

    #[test]
    fn precision_is_recall_of_swapped((gold, system) in aligned_pair()) {
        let forward = score_partitions(&gold, &system).unwrap();
        let backward = score_partitions(&system, &gold).unwrap();
        for (f, b) in [
            (forward.muc, backward.muc),
            (forward.b_cubed, backward.b_cubed),
            (forward.ceaf_e, backward.ceaf_e),
        ] {
            prop_assert!((f.precision - b.recall).abs() < 1e-9);
            prop_assert!((f.recall - b.precision).abs() < 1e-9);
        }
    }

    #[test]
    fn scores_are_bounded((gold, system) in aligned_pair()) {
        let eval = score_partitions(&gold, &system).unwrap();
        prop_assert!(in_unit_range(&eval.muc));
        prop_assert!(in_unit_range(&eval.b_cubed));
        prop_assert!(in_unit_range(&eval.ceaf_e));
        prop_assert!(in_unit_range(&eval.conll));
    }

    #[test]
    fn scoring_does_not_mutate((gold, system) in aligned_pair()) {
        let (g, s) = (gold.clone(), system.clone());
        let _ = score_partitions(&gold, &system).unwrap();
        prop_assert_eq!(gold, g);
        prop_assert_eq!(system, s);
    }

    #[test]
    fn micro_sum_of_one_is_the_document((gold, system) in aligned_pair()) {
        let counts = CorefCounts::from_partitions(&gold, &system).unwrap();
        let summed: CorefCounts = std::iter::once(counts).sum();
        prop_assert_eq!(summed.evaluation(), score_partitions(&gold, &system).unwrap());
    }

    #[test]
    fn assignment_is_optimal(
        rows in 1..5usize,
        cols in 1..5usize,
        seed in prop::collection::vec(0..100u32, 25),
    ) {
        let weights: Vec<Vec<f64>> = (0..rows)
            .map(|r| (0..cols).map(|c| f64::from(seed[r * 5 + c]) / 100.0).collect())
            .collect();
        let best = max_weight_assignment(&weights);
        prop_assert_eq!(best.pairs.len(), rows.min(cols));
        prop_assert!((best.total - brute_force_max(&weights, cols)).abs() < 1e-9);
    }
}

#[test]
fn b_cubed_split_cluster() {
    let gold = Partition::new(vec![vec![1, 2, 3], vec![4]]).unwrap();
    let system = Partition::new(vec![vec![1, 2], vec![3], vec![4]]).unwrap();
    let eval = score_partitions(&gold, &system).unwrap();
    assert!((eval.b_cubed.recall - 0.6667).abs() < 1e-4);
    assert!((eval.b_cubed.precision - 1.0).abs() < 1e-9);
}
