//! Candidate selection: which existing entities a new mention may link to.

use stroll_core::{Entity, EntityStore, Mention};

/// Picks an ordered set of link candidates for a mention.
///
/// Implementations must be deterministic and side-effect free: the decision
/// procedure relies on the same store producing the same candidates.
///
/// The ranker does not own the candidate bound. The resolver keeps only the
/// first `max_candidates` of whatever is returned, so a ranker may return
/// more and the configured bound still holds.
pub trait CandidateRanker: Send + Sync {
    /// Candidates for `mention`, best first.
    fn rank<'s, 'd>(&self, store: &'s EntityStore<'d>, mention: &Mention)
        -> Vec<&'s Entity<'d>>;
}

/// Most recently mentioned entities first.
///
/// Entities are ordered by the sentence rank of their latest mention,
/// descending. Ties keep creation order (lower entity rank first). The
/// target mention itself does not influence the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyRanker {
    limit: usize,
}

impl RecencyRanker {
    /// Ranker returning at most `limit` candidates.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Maximum number of candidates returned.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for RecencyRanker {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_CANDIDATES)
    }
}

impl CandidateRanker for RecencyRanker {
    fn rank<'s, 'd>(
        &self,
        store: &'s EntityStore<'d>,
        _mention: &Mention,
    ) -> Vec<&'s Entity<'d>> {
        let mut ranking: Vec<&Entity<'d>> = store.all().iter().collect();
        // stable: equal recency keeps rank order
        ranking.sort_by_key(|e| std::cmp::Reverse(e.recency()));
        ranking.truncate(self.limit);
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stroll_core::MentionId;

    fn mention(sent: usize, head: usize) -> Mention {
        Mention::new(MentionId::new(0, sent, head), format!("m{sent}.{head}"))
    }

    #[test]
    fn test_empty_store_has_no_candidates() {
        let store = EntityStore::new();
        let target = mention(0, 0);
        assert!(RecencyRanker::default().rank(&store, &target).is_empty());
    }

    #[test]
    fn test_most_recent_first_with_rank_tiebreak() {
        let ms = vec![mention(0, 0), mention(1, 0), mention(1, 2), mention(2, 0)];
        let mut store = EntityStore::new();
        let e0 = store.create(&ms[0]); // recency 0
        store.create(&ms[1]); // recency 1
        store.create(&ms[2]); // recency 1
        store.append(e0, &ms[3]).unwrap(); // e0 -> recency 2

        let target = mention(3, 0);
        let ranks: Vec<usize> = RecencyRanker::new(20)
            .rank(&store, &target)
            .iter()
            .map(|e| e.rank())
            .collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let ms: Vec<Mention> = (0..30).map(|s| mention(s, 0)).collect();
        let mut store = EntityStore::new();
        for m in &ms {
            store.create(m);
        }
        let target = mention(30, 0);
        let ranker = RecencyRanker::new(20);
        let candidates = ranker.rank(&store, &target);
        assert_eq!(candidates.len(), 20);
        assert_eq!(candidates[0].rank(), 29);
        assert_eq!(candidates[19].rank(), 10);
        assert_eq!(ranker.limit(), 20);
    }

    #[test]
    fn test_zero_limit() {
        let ms = vec![mention(0, 0)];
        let mut store = EntityStore::new();
        store.create(&ms[0]);
        assert!(RecencyRanker::new(0).rank(&store, &ms[0]).is_empty());
    }
}
