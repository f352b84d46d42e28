//! Entity-centric incremental coreference resolution.
//!
//! Mentions of a document are visited once, in textual order. For each
//! mention the resolver asks a [`CandidateRanker`] for a bounded list of
//! existing entities, asks an [`ActionScorer`] to score "start a new entity"
//! against "link to candidate i", and applies the best action. Decisions are
//! final: there is no backtracking, so every decision depends on all earlier
//! ones in the same document.
//!
//! # Action space
//!
//! The action space has a fixed width of `max_candidates + 1`:
//!
//! ```text
//! index:   0        1 .. k           k+1 .. max_candidates
//! action:  new      link cand[i-1]   padding (masked, never selected)
//! ```
//!
//! Padding slots are masked in [`ActionVector`] and can never be selected.
//!
//! # Example
//!
//! ```rust
//! use stroll::resolver::resolve;
//! use stroll::scorer::NewEntityScorer;
//! use stroll_core::{Document, Mention, MentionId};
//!
//! let mut doc = Document::new("d1", 0);
//! for head in 0..3 {
//!     doc.push_mention(Mention::new(MentionId::new(0, 0, head), "het"));
//! }
//!
//! let system = resolve(&doc, 20, &NewEntityScorer)?;
//! assert_eq!(system.len(), 3);
//! # Ok::<(), stroll::Error>(())
//! ```

use crate::candidates::{CandidateRanker, RecencyRanker};
use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::scorer::ActionScorer;
use serde::Serialize;
use std::fmt;
use stroll_core::{Document, Entity, EntityStore, MentionId, Partition};

// =============================================================================
// Actions
// =============================================================================

/// A discrete resolver action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    /// Start a new entity with the mention.
    NewEntity,
    /// Append the mention to the candidate at this (0-based) position.
    Link(usize),
}

impl Action {
    /// Position in the action vector.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Action::NewEntity => 0,
            Action::Link(i) => i + 1,
        }
    }

    fn from_index(index: usize) -> Self {
        match index {
            0 => Action::NewEntity,
            i => Action::Link(i - 1),
        }
    }
}

/// Fixed-width score vector with a mask of selectable actions.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionVector {
    scores: Vec<f64>,
    valid: usize,
}

impl ActionVector {
    /// Place the scores for `candidates` candidates into a vector of `width`
    /// slots; slots past `candidates + 1` are padding.
    ///
    /// # Errors
    ///
    /// Returns a description of the defect if `scores` does not hold exactly
    /// `candidates + 1` finite values, or if they do not fit in `width`.
    pub fn from_scores(
        width: usize,
        candidates: usize,
        scores: &[f64],
    ) -> std::result::Result<Self, String> {
        let valid = candidates + 1;
        if scores.len() != valid {
            return Err(format!(
                "expected {valid} scores for {candidates} candidates, got {}",
                scores.len()
            ));
        }
        if valid > width {
            return Err(format!(
                "{candidates} candidates do not fit an action space of width {width}"
            ));
        }
        if let Some((i, s)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            return Err(format!("score {i} is not finite ({s})"));
        }

        let mut padded = vec![f64::NEG_INFINITY; width];
        padded[..valid].copy_from_slice(scores);
        Ok(Self {
            scores: padded,
            valid,
        })
    }

    /// Total number of slots, padding included.
    #[must_use]
    pub fn width(&self) -> usize {
        self.scores.len()
    }

    /// Number of selectable slots.
    #[must_use]
    pub fn valid(&self) -> usize {
        self.valid
    }

    /// Whether slot `index` may be selected.
    #[must_use]
    pub fn is_valid(&self, index: usize) -> bool {
        index < self.valid
    }

    /// Score of a selectable slot; `None` for padding.
    #[must_use]
    pub fn score(&self, index: usize) -> Option<f64> {
        self.is_valid(index).then(|| self.scores[index])
    }

    /// Highest-scoring selectable action; ties go to the lowest index.
    #[must_use]
    pub fn best(&self) -> Action {
        let mut best = 0;
        for i in 1..self.valid {
            if self.scores[i] > self.scores[best] {
                best = i;
            }
        }
        Action::from_index(best)
    }
}

// =============================================================================
// Decisions and results
// =============================================================================

/// Record of one resolver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Mention that was placed.
    pub mention: MentionId,
    /// Action taken.
    pub action: Action,
    /// Rank of the entity the mention ended up in.
    pub entity: usize,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            Action::NewEntity => write!(f, "{}", self.entity),
            Action::Link(_) => write!(f, "{}L", self.entity),
        }
    }
}

/// Entities built for one document, plus the decision trace.
#[derive(Debug, Clone)]
pub struct Resolution<'d> {
    doc_id: String,
    store: EntityStore<'d>,
    decisions: Vec<Decision>,
}

impl<'d> Resolution<'d> {
    /// Identifier of the resolved document.
    #[must_use]
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Entities in rank order.
    #[must_use]
    pub fn entities(&self) -> &[Entity<'d>] {
        self.store.all()
    }

    /// The underlying entity store.
    #[must_use]
    pub fn store(&self) -> &EntityStore<'d> {
        &self.store
    }

    /// Decisions in mention order (empty when tracing is off).
    #[must_use]
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Human-readable trace: entity rank per mention, `L` marking links.
    #[must_use]
    pub fn trace(&self) -> String {
        self.decisions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// System partition, one cluster per entity.
    ///
    /// # Errors
    ///
    /// Propagates partition construction errors (not expected for a
    /// resolution produced by [`EntityResolver`]).
    pub fn partition(&self) -> Result<Partition<MentionId>> {
        Ok(self.store.partition()?)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// The greedy, one-pass decision procedure.
#[derive(Debug, Clone)]
pub struct EntityResolver<R = RecencyRanker> {
    config: ResolverConfig,
    ranker: R,
}

impl Default for EntityResolver<RecencyRanker> {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl EntityResolver<RecencyRanker> {
    /// Resolver with recency ranking bounded by `config.max_candidates`.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        let ranker = RecencyRanker::new(config.max_candidates);
        Self { config, ranker }
    }
}

impl<R: CandidateRanker> EntityResolver<R> {
    /// Resolver with a custom candidate ranker.
    ///
    /// `config.max_candidates` is authoritative: the resolver keeps the first
    /// `max_candidates` entities the ranker returns and drops the rest, so the
    /// action width never depends on the ranker.
    #[must_use]
    pub fn with_ranker(config: ResolverConfig, ranker: R) -> Self {
        Self { config, ranker }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Cluster the mentions of `document`.
    ///
    /// An empty document resolves to an empty store.
    ///
    /// # Errors
    ///
    /// - [`Error::Core`] if the document violates its invariants
    /// - [`Error::InvalidScore`] if the scorer returns a vector of the wrong
    ///   length or with non-finite values
    /// - any error returned by the scorer itself
    pub fn resolve<'d, S>(&self, document: &'d Document, scorer: &S) -> Result<Resolution<'d>>
    where
        S: ActionScorer + ?Sized,
    {
        document.validate()?;

        let width = self.config.action_width();
        let mut store = EntityStore::new();
        let mut decisions = Vec::new();

        for mention in &document.mentions {
            let mut candidates = self.ranker.rank(&store, mention);
            if candidates.len() > self.config.max_candidates {
                log::trace!(
                    "{}: ranker returned {} candidates for {}, keeping {}",
                    document.doc_id,
                    candidates.len(),
                    mention.id,
                    self.config.max_candidates
                );
                candidates.truncate(self.config.max_candidates);
            }

            let scores = scorer.score(mention, &candidates)?;
            let actions = ActionVector::from_scores(width, candidates.len(), &scores)
                .map_err(|reason| {
                    Error::invalid_score(&document.doc_id, format!("mention {}: {reason}", mention.id))
                })?;

            let action = actions.best();
            let link_target = match action {
                Action::NewEntity => None,
                Action::Link(i) => Some(candidates[i].rank()),
            };

            let entity = match link_target {
                Some(rank) => {
                    store.append(rank, mention)?;
                    rank
                }
                None => store.create(mention),
            };

            if self.config.record_trace {
                decisions.push(Decision {
                    mention: mention.id,
                    action,
                    entity,
                });
            }
        }

        let resolution = Resolution {
            doc_id: document.doc_id.clone(),
            store,
            decisions,
        };
        log::debug!(
            "{}: {} mentions -> {} entities [{}]",
            document.doc_id,
            document.len(),
            resolution.entities().len(),
            resolution.trace()
        );
        Ok(resolution)
    }

    /// Resolve `document` and write the entity ranks onto its mentions.
    ///
    /// # Errors
    ///
    /// See [`EntityResolver::resolve`].
    pub fn resolve_and_annotate<S>(
        &self,
        document: &mut Document,
        scorer: &S,
    ) -> Result<Partition<MentionId>>
    where
        S: ActionScorer + ?Sized,
    {
        let partition = self.resolve(document, scorer)?.partition()?;
        document.annotate(&partition);
        Ok(partition)
    }
}

/// Resolve a document with recency ranking and return the system partition.
///
/// # Errors
///
/// See [`EntityResolver::resolve`].
pub fn resolve<S>(
    document: &Document,
    candidate_limit: usize,
    scorer: &S,
) -> Result<Partition<MentionId>>
where
    S: ActionScorer + ?Sized,
{
    let config = ResolverConfig {
        max_candidates: candidate_limit,
        record_trace: false,
    };
    EntityResolver::new(config).resolve(document, scorer)?.partition()
}
