//! Partitions of mention identifiers.
//!
//! A [`Partition`] groups every mention of a universe into exactly one
//! cluster. Both the gold annotation and the resolver's output are reduced to
//! partitions before scoring, so the type is generic over the identifier: the
//! resolver uses [`MentionId`](crate::MentionId), tests and external tools can
//! use integers or strings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

/// Requirements for a mention identifier used as partition key.
pub trait MentionKey: Clone + Eq + Hash + Ord + fmt::Debug {}

impl<T: Clone + Eq + Hash + Ord + fmt::Debug> MentionKey for T {}

/// A set of disjoint, non-empty clusters of mention identifiers.
///
/// Cluster order is preserved from construction; for system partitions it is
/// entity rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Vec<K>>",
    into = "Vec<Vec<K>>",
    bound(
        serialize = "K: MentionKey + Serialize",
        deserialize = "K: MentionKey + Deserialize<'de>"
    )
)]
pub struct Partition<K: MentionKey> {
    clusters: Vec<BTreeSet<K>>,
}

impl<K: MentionKey> Partition<K> {
    /// Build a partition, checking that no identifier occurs twice.
    ///
    /// Empty clusters are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OverlappingClusters`] naming the first repeated
    /// identifier.
    pub fn new<I, C>(clusters: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = K>,
    {
        let mut seen: HashSet<K> = HashSet::new();
        let mut out = Vec::new();

        for cluster in clusters {
            let mut set = BTreeSet::new();
            for key in cluster {
                if !seen.insert(key.clone()) {
                    return Err(Error::OverlappingClusters(format!("{key:?}")));
                }
                set.insert(key);
            }
            if !set.is_empty() {
                out.push(set);
            }
        }

        Ok(Self { clusters: out })
    }

    /// Partition with no clusters.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            clusters: Vec::new(),
        }
    }

    /// The clusters.
    #[must_use]
    pub fn clusters(&self) -> &[BTreeSet<K>] {
        &self.clusters
    }

    /// Iterate over the clusters.
    pub fn iter(&self) -> std::slice::Iter<'_, BTreeSet<K>> {
        self.clusters.iter()
    }

    /// Number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether there are no clusters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Number of mentions across all clusters.
    #[must_use]
    pub fn mention_count(&self) -> usize {
        self.clusters.iter().map(BTreeSet::len).sum()
    }

    /// Number of single-mention clusters.
    #[must_use]
    pub fn singleton_count(&self) -> usize {
        self.clusters.iter().filter(|c| c.len() == 1).count()
    }

    /// All identifiers covered by the partition.
    #[must_use]
    pub fn universe(&self) -> BTreeSet<K> {
        self.clusters.iter().flatten().cloned().collect()
    }

    /// Map from identifier to the index of its cluster.
    #[must_use]
    pub fn cluster_index(&self) -> HashMap<K, usize> {
        let mut index = HashMap::with_capacity(self.mention_count());
        for (idx, cluster) in self.clusters.iter().enumerate() {
            for key in cluster {
                index.insert(key.clone(), idx);
            }
        }
        index
    }

    /// Check that `other` covers exactly the same identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnalignedPartitions`] with the size of both one-sided
    /// differences.
    pub fn ensure_aligned(&self, other: &Self) -> Result<()> {
        let ours = self.universe();
        let theirs = other.universe();
        if ours == theirs {
            return Ok(());
        }

        let only_ours: Vec<&K> = ours.difference(&theirs).collect();
        let only_theirs: Vec<&K> = theirs.difference(&ours).collect();
        let example = only_ours
            .first()
            .or_else(|| only_theirs.first())
            .map(|k| format!("{k:?}"))
            .unwrap_or_default();

        Err(Error::UnalignedPartitions {
            gold_only: only_ours.len(),
            system_only: only_theirs.len(),
            example,
        })
    }
}

impl<K: MentionKey> Default for Partition<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: MentionKey> TryFrom<Vec<Vec<K>>> for Partition<K> {
    type Error = Error;

    fn try_from(clusters: Vec<Vec<K>>) -> Result<Self> {
        Self::new(clusters)
    }
}

impl<K: MentionKey> From<Partition<K>> for Vec<Vec<K>> {
    fn from(partition: Partition<K>) -> Self {
        partition
            .clusters
            .into_iter()
            .map(|c| c.into_iter().collect())
            .collect()
    }
}

impl<'a, K: MentionKey> IntoIterator for &'a Partition<K> {
    type Item = &'a BTreeSet<K>;
    type IntoIter = std::slice::Iter<'a, BTreeSet<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_drops_empty_clusters() {
        let p = Partition::new(vec![vec![1, 2], vec![], vec![3]]).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.mention_count(), 3);
        assert_eq!(p.singleton_count(), 1);
    }

    #[test]
    fn test_new_rejects_overlap() {
        let err = Partition::new(vec![vec![1, 2], vec![2, 3]]).unwrap_err();
        assert_eq!(err, Error::OverlappingClusters("2".to_string()));
    }

    #[test]
    fn test_cluster_index() {
        let p = Partition::new(vec![vec!["a", "b"], vec!["c"]]).unwrap();
        let index = p.cluster_index();
        assert_eq!(index["a"], 0);
        assert_eq!(index["b"], 0);
        assert_eq!(index["c"], 1);
    }

    #[test]
    fn test_alignment() {
        let gold = Partition::new(vec![vec![1, 2, 3], vec![4]]).unwrap();
        let same = Partition::new(vec![vec![1], vec![2], vec![3, 4]]).unwrap();
        let other = Partition::new(vec![vec![1, 2], vec![5]]).unwrap();

        assert!(gold.ensure_aligned(&same).is_ok());
        match gold.ensure_aligned(&other) {
            Err(Error::UnalignedPartitions {
                gold_only,
                system_only,
                ..
            }) => {
                assert_eq!(gold_only, 2);
                assert_eq!(system_only, 1);
            }
            other => panic!("expected unaligned error, got {other:?}"),
        }
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let p = Partition::new(vec![vec![3, 1], vec![2]]).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[[1,3],[2]]");

        let bad: std::result::Result<Partition<u32>, _> = serde_json::from_str("[[1],[1]]");
        assert!(bad.is_err());
    }
}
