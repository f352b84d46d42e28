//! Coreference evaluation metrics over mention partitions.
//!
//! # Metric Summary
//!
//! | Metric | Focus | Key Property |
//! |--------|-------|--------------|
//! | **MUC** | Links | Ignores singletons; counts minimum links |
//! | **B³** | Mentions | Per-mention P/R; singletons included |
//! | **CEAF-e** | Entities | Optimal one-to-one alignment, Dice similarity |
//! | **CoNLL** | Composite | Mean of MUC, B³, CEAF-e |
//!
//! Every metric is kept as numerator/denominator sums ([`MetricCounts`]).
//! Per-document scores divide one document's sums; corpus scores add the
//! sums of all documents first and divide once (micro-averaging).
//!
//! A zero denominator yields a score of 0 rather than an error. MUC has no
//! links to count when every cluster is a singleton, so it scores 0 even
//! for a perfect system in that case.
//!
//! # References
//!
//! - MUC: Vilain et al., 1995
//! - B³: Bagga & Baldwin, 1998
//! - CEAF: Luo, 2005
//!
//! # Example
//!
//! ```rust
//! use stroll::eval::coref_metrics::score_partitions;
//! use stroll_core::Partition;
//!
//! let gold = Partition::new(vec![vec![1, 2, 3], vec![4]])?;
//! let system = Partition::new(vec![vec![1, 2], vec![3], vec![4]])?;
//!
//! let eval = score_partitions(&gold, &system)?;
//! assert!((eval.b_cubed.recall - 2.0 / 3.0).abs() < 1e-4);
//! assert!((eval.b_cubed.precision - 1.0).abs() < 1e-9);
//! # Ok::<(), stroll::Error>(())
//! ```

use super::assignment::max_weight_assignment;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use stroll_core::{MentionKey, Partition};

// =============================================================================
// Result Types
// =============================================================================

/// Precision, recall and F1 for one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorefScores {
    /// Precision
    pub precision: f64,
    /// Recall
    pub recall: f64,
    /// F1 score
    pub f1: f64,
}

impl CorefScores {
    /// Create scores; F1 is the harmonic mean, 0 when both inputs are 0.
    #[must_use]
    pub fn new(precision: f64, recall: f64) -> Self {
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
        }
    }

    fn mean(scores: [CorefScores; 3]) -> Self {
        let n = scores.len() as f64;
        Self {
            precision: scores.iter().map(|s| s.precision).sum::<f64>() / n,
            recall: scores.iter().map(|s| s.recall).sum::<f64>() / n,
            f1: scores.iter().map(|s| s.f1).sum::<f64>() / n,
        }
    }
}

/// Numerator and denominator sums behind one metric's precision and recall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricCounts {
    /// Recall numerator.
    pub recall_num: f64,
    /// Recall denominator.
    pub recall_den: f64,
    /// Precision numerator.
    pub precision_num: f64,
    /// Precision denominator.
    pub precision_den: f64,
}

impl MetricCounts {
    /// Recall, or 0 for a zero denominator.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.recall_num, self.recall_den)
    }

    /// Precision, or 0 for a zero denominator.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.precision_num, self.precision_den)
    }

    /// Whether either denominator is zero.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.recall_den == 0.0 || self.precision_den == 0.0
    }

    /// Divide into scores.
    #[must_use]
    pub fn scores(&self) -> CorefScores {
        CorefScores::new(self.precision(), self.recall())
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

impl Add for MetricCounts {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for MetricCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.recall_num += rhs.recall_num;
        self.recall_den += rhs.recall_den;
        self.precision_num += rhs.precision_num;
        self.precision_den += rhs.precision_den;
    }
}

/// Complete coreference evaluation results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorefEvaluation {
    /// MUC metric
    pub muc: CorefScores,
    /// B-cubed metric
    pub b_cubed: CorefScores,
    /// CEAF entity-based
    pub ceaf_e: CorefScores,
    /// CoNLL: mean of the precisions, recalls and F1s above
    pub conll: CorefScores,
}

impl CorefEvaluation {
    /// Combine the three metrics and derive the CoNLL average.
    #[must_use]
    pub fn from_scores(muc: CorefScores, b_cubed: CorefScores, ceaf_e: CorefScores) -> Self {
        Self {
            muc,
            b_cubed,
            ceaf_e,
            conll: CorefScores::mean([muc, b_cubed, ceaf_e]),
        }
    }

    /// CoNLL F1.
    #[must_use]
    pub fn conll_f1(&self) -> f64 {
        self.conll.f1
    }

    /// One-line F1 summary.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "MUC={:.1}% B³={:.1}% CEAFe={:.1}% CoNLL={:.1}%",
            self.muc.f1 * 100.0,
            self.b_cubed.f1 * 100.0,
            self.ceaf_e.f1 * 100.0,
            self.conll.f1 * 100.0,
        )
    }
}

impl fmt::Display for CorefEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("MUC:   ", &self.muc),
            ("B³:    ", &self.b_cubed),
            ("CEAFe: ", &self.ceaf_e),
            ("CoNLL: ", &self.conll),
        ];
        writeln!(f, "Coreference Evaluation Results:")?;
        for (label, s) in rows {
            writeln!(
                f,
                "  {label} P={:.1}%  R={:.1}%  F1={:.1}%",
                s.precision * 100.0,
                s.recall * 100.0,
                s.f1 * 100.0
            )?;
        }
        Ok(())
    }
}

// =============================================================================
// Counting
// =============================================================================

/// Overlap of gold and system clusters.
///
/// Only built from aligned partitions, so every mention lies in exactly one
/// gold and one system cluster.
struct Contingency {
    gold_sizes: Vec<usize>,
    system_sizes: Vec<usize>,
    /// (gold cluster, system cluster) -> shared mentions; zero cells omitted
    overlap: BTreeMap<(usize, usize), usize>,
    mentions: usize,
}

impl Contingency {
    fn new<K: MentionKey>(gold: &Partition<K>, system: &Partition<K>) -> Result<Self> {
        gold.ensure_aligned(system)?;

        let system_index: HashMap<K, usize> = system.cluster_index();
        let mut overlap = BTreeMap::new();
        for (gi, cluster) in gold.iter().enumerate() {
            for key in cluster {
                if let Some(&si) = system_index.get(key) {
                    *overlap.entry((gi, si)).or_insert(0) += 1;
                }
            }
        }

        Ok(Self {
            gold_sizes: gold.iter().map(|c| c.len()).collect(),
            system_sizes: system.iter().map(|c| c.len()).collect(),
            overlap,
            mentions: gold.mention_count(),
        })
    }

    fn muc(&self) -> MetricCounts {
        // number of clusters on the other side each cluster is split across
        let mut gold_parts = vec![0usize; self.gold_sizes.len()];
        let mut system_parts = vec![0usize; self.system_sizes.len()];
        for &(gi, si) in self.overlap.keys() {
            gold_parts[gi] += 1;
            system_parts[si] += 1;
        }

        let links = |sizes: &[usize], parts: &[usize]| -> (f64, f64) {
            sizes.iter().zip(parts).fold((0.0, 0.0), |(num, den), (&size, &p)| {
                (num + (size - p) as f64, den + (size - 1) as f64)
            })
        };
        let (recall_num, recall_den) = links(&self.gold_sizes, &gold_parts);
        let (precision_num, precision_den) = links(&self.system_sizes, &system_parts);

        MetricCounts {
            recall_num,
            recall_den,
            precision_num,
            precision_den,
        }
    }

    fn b_cubed(&self) -> MetricCounts {
        let mut counts = MetricCounts {
            recall_den: self.mentions as f64,
            precision_den: self.mentions as f64,
            ..MetricCounts::default()
        };
        for (&(gi, si), &n) in &self.overlap {
            let n2 = (n * n) as f64;
            counts.recall_num += n2 / self.gold_sizes[gi] as f64;
            counts.precision_num += n2 / self.system_sizes[si] as f64;
        }
        counts
    }

    fn ceaf_e(&self) -> MetricCounts {
        let mut similarity = vec![vec![0.0; self.system_sizes.len()]; self.gold_sizes.len()];
        for (&(gi, si), &n) in &self.overlap {
            similarity[gi][si] =
                2.0 * n as f64 / (self.gold_sizes[gi] + self.system_sizes[si]) as f64;
        }
        let total = max_weight_assignment(&similarity).total;

        MetricCounts {
            recall_num: total,
            recall_den: self.gold_sizes.len() as f64,
            precision_num: total,
            precision_den: self.system_sizes.len() as f64,
        }
    }
}

/// Count sums for all three metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorefCounts {
    /// MUC sums
    pub muc: MetricCounts,
    /// B-cubed sums
    pub b_cubed: MetricCounts,
    /// CEAF-e sums
    pub ceaf_e: MetricCounts,
}

impl CorefCounts {
    /// Count metric sums for a gold and a system partition.
    ///
    /// # Errors
    ///
    /// Returns an unaligned-partitions error if the two partitions do not
    /// cover the same mentions.
    pub fn from_partitions<K: MentionKey>(
        gold: &Partition<K>,
        system: &Partition<K>,
    ) -> Result<Self> {
        let table = Contingency::new(gold, system)?;
        Ok(Self {
            muc: table.muc(),
            b_cubed: table.b_cubed(),
            ceaf_e: table.ceaf_e(),
        })
    }

    /// Turn sums into scores.
    #[must_use]
    pub fn evaluation(&self) -> CorefEvaluation {
        for (name, counts) in [
            ("MUC", &self.muc),
            ("B³", &self.b_cubed),
            ("CEAFe", &self.ceaf_e),
        ] {
            if counts.is_degenerate() {
                log::debug!(
                    "{name}: zero denominator (recall {}/{}, precision {}/{}), scoring 0",
                    counts.recall_num,
                    counts.recall_den,
                    counts.precision_num,
                    counts.precision_den
                );
            }
        }
        CorefEvaluation::from_scores(
            self.muc.scores(),
            self.b_cubed.scores(),
            self.ceaf_e.scores(),
        )
    }
}

impl Add for CorefCounts {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for CorefCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.muc += rhs.muc;
        self.b_cubed += rhs.b_cubed;
        self.ceaf_e += rhs.ceaf_e;
    }
}

impl Sum for CorefCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Score a system partition against gold with MUC, B³, CEAF-e and CoNLL.
///
/// # Errors
///
/// Returns an unaligned-partitions error if the two partitions do not
/// cover the same mentions.
pub fn score_partitions<K: MentionKey>(
    gold: &Partition<K>,
    system: &Partition<K>,
) -> Result<CorefEvaluation> {
    Ok(CorefCounts::from_partitions(gold, system)?.evaluation())
}

/// MUC (precision, recall, F1).
///
/// # Errors
///
/// See [`score_partitions`].
pub fn muc_score<K: MentionKey>(gold: &Partition<K>, system: &Partition<K>) -> Result<CorefScores> {
    Ok(Contingency::new(gold, system)?.muc().scores())
}

/// B-cubed (precision, recall, F1).
///
/// # Errors
///
/// See [`score_partitions`].
pub fn b_cubed_score<K: MentionKey>(
    gold: &Partition<K>,
    system: &Partition<K>,
) -> Result<CorefScores> {
    Ok(Contingency::new(gold, system)?.b_cubed().scores())
}

/// CEAF-e (precision, recall, F1).
///
/// # Errors
///
/// See [`score_partitions`].
pub fn ceaf_e_score<K: MentionKey>(
    gold: &Partition<K>,
    system: &Partition<K>,
) -> Result<CorefScores> {
    Ok(Contingency::new(gold, system)?.ceaf_e().scores())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn p(clusters: Vec<Vec<u32>>) -> Partition<u32> {
        Partition::new(clusters).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_scores_f1() {
        let s = CorefScores::new(0.5, 1.0);
        assert!(close(s.f1, 2.0 / 3.0));
        assert_eq!(CorefScores::new(0.0, 0.0).f1, 0.0);
    }

    #[test]
    fn test_identity() {
        let gold = p(vec![vec![1, 2, 3], vec![4, 5], vec![6]]);
        let eval = score_partitions(&gold, &gold).unwrap();
        for s in [eval.muc, eval.b_cubed, eval.ceaf_e, eval.conll] {
            assert!(close(s.precision, 1.0));
            assert!(close(s.recall, 1.0));
            assert!(close(s.f1, 1.0));
        }
    }

    #[test]
    fn test_all_singletons_identity_muc_is_zero() {
        let gold = p(vec![vec![1], vec![2]]);
        let eval = score_partitions(&gold, &gold).unwrap();
        assert_eq!(eval.muc, CorefScores::default());
        assert!(close(eval.b_cubed.f1, 1.0));
        assert!(close(eval.ceaf_e.f1, 1.0));
    }

    #[test]
    fn test_split_cluster() {
        let gold = p(vec![vec![1, 2, 3], vec![4]]);
        let system = p(vec![vec![1, 2], vec![3], vec![4]]);

        let muc = muc_score(&gold, &system).unwrap();
        assert!(close(muc.recall, 0.5));
        assert!(close(muc.precision, 1.0));

        let b3 = b_cubed_score(&gold, &system).unwrap();
        assert!(close(b3.recall, (4.0 / 3.0 + 1.0 / 3.0 + 1.0) / 4.0));
        assert!(close(b3.precision, 1.0));

        // {1,2,3}~{1,2}: 0.8, {4}~{4}: 1.0
        let ceaf = ceaf_e_score(&gold, &system).unwrap();
        assert!(close(ceaf.recall, 1.8 / 2.0));
        assert!(close(ceaf.precision, 1.8 / 3.0));
    }

    #[test]
    fn test_all_new_against_one_cluster() {
        let gold = p(vec![vec![1, 2, 3]]);
        let system = p(vec![vec![1], vec![2], vec![3]]);
        let eval = score_partitions(&gold, &system).unwrap();
        assert_eq!(eval.muc.recall, 0.0);
        assert_eq!(eval.muc.precision, 0.0);
        assert!(close(eval.b_cubed.recall, 1.0 / 3.0));
        assert!(close(eval.b_cubed.precision, 1.0));
    }

    #[test]
    fn test_symmetry() {
        let a = p(vec![vec![1, 2, 3, 4], vec![5, 6], vec![7]]);
        let b = p(vec![vec![1, 2], vec![3, 4, 5], vec![6, 7]]);
        let ab = score_partitions(&a, &b).unwrap();
        let ba = score_partitions(&b, &a).unwrap();
        for (x, y) in [(ab.muc, ba.muc), (ab.b_cubed, ba.b_cubed), (ab.ceaf_e, ba.ceaf_e)] {
            assert!(close(x.precision, y.recall));
            assert!(close(x.recall, y.precision));
        }
    }

    #[test]
    fn test_conll_is_mean() {
        let gold = p(vec![vec![1, 2, 3], vec![4]]);
        let system = p(vec![vec![1, 2], vec![3], vec![4]]);
        let eval = score_partitions(&gold, &system).unwrap();
        let f1 = (eval.muc.f1 + eval.b_cubed.f1 + eval.ceaf_e.f1) / 3.0;
        assert!(close(eval.conll_f1(), f1));
        let r = (eval.muc.recall + eval.b_cubed.recall + eval.ceaf_e.recall) / 3.0;
        assert!(close(eval.conll.recall, r));
    }

    #[test]
    fn test_empty_partitions() {
        let empty: Partition<u32> = Partition::empty();
        let eval = score_partitions(&empty, &empty).unwrap();
        assert_eq!(eval, CorefEvaluation::default());
    }

    #[test]
    fn test_unaligned_is_error() {
        let gold = p(vec![vec![1, 2]]);
        let system = p(vec![vec![1, 3]]);
        assert!(matches!(
            score_partitions(&gold, &system),
            Err(Error::Core(stroll_core::Error::UnalignedPartitions { .. }))
        ));
    }

    #[test]
    fn test_counts_add_micro_average() {
        let g1 = p(vec![vec![1, 2]]);
        let s1 = p(vec![vec![1, 2]]);
        let g2 = p(vec![vec![1, 2, 3]]);
        let s2 = p(vec![vec![1], vec![2], vec![3]]);

        let total = CorefCounts::from_partitions(&g1, &s1).unwrap()
            + CorefCounts::from_partitions(&g2, &s2).unwrap();
        // MUC recall: (1 + 0) / (1 + 2)
        assert!(close(total.muc.recall(), 1.0 / 3.0));
        assert!(close(total.b_cubed.recall_den, 5.0));

        let summed: CorefCounts = vec![
            CorefCounts::from_partitions(&g1, &s1).unwrap(),
            CorefCounts::from_partitions(&g2, &s2).unwrap(),
        ]
        .into_iter()
        .sum();
        assert_eq!(summed, total);
    }

    #[test]
    fn test_display_and_summary() {
        let gold = p(vec![vec![1, 2]]);
        let eval = score_partitions(&gold, &gold).unwrap();
        assert!(eval.summary_line().contains("CoNLL=100.0%"));
        assert!(eval.to_string().contains("B³:"));
    }
}
