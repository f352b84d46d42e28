//! Action scorers: the capability that rates "start a new entity" against
//! "link to candidate i" for one mention.
//!
//! The learned scoring network is an external collaborator; anything that
//! implements [`ActionScorer`] can drive the resolver. The scorers in this
//! module are deterministic baselines, useful for tests and as reference
//! points in evaluation:
//!
//! | Scorer | Behaviour |
//! |--------|-----------|
//! | [`NewEntityScorer`] | never links (all singletons) |
//! | [`NearestCandidateScorer`] | always links to the most recent entity |
//! | [`HeadMatchScorer`] | links on identical head word |
//! | [`VectorScorer`] | links on head-word vector similarity |

use crate::config::{ScorerConfig, ScorerKind};
use crate::error::{Error, Result};
use crate::vectors::{centroid, cosine, FallbackPolicy, WordVectors};
use stroll_core::{Entity, Mention};

/// Scores the possible actions for a mention.
///
/// The returned vector must have exactly `candidates.len() + 1` finite
/// entries: index 0 scores "start a new entity", index `i` scores "link to
/// `candidates[i - 1]`". Higher is better; the resolver picks the maximum and
/// breaks ties towards the lower index.
pub trait ActionScorer: Send + Sync {
    /// Score every action for `mention`.
    ///
    /// # Errors
    ///
    /// Implementations return an error when inference fails.
    fn score(&self, mention: &Mention, candidates: &[&Entity<'_>]) -> Result<Vec<f64>>;

    /// Scorer name, for logs and reports.
    fn name(&self) -> &'static str {
        "unknown"
    }
}

impl<S: ActionScorer + ?Sized> ActionScorer for &S {
    fn score(&self, mention: &Mention, candidates: &[&Entity<'_>]) -> Result<Vec<f64>> {
        (**self).score(mention, candidates)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<S: ActionScorer + ?Sized> ActionScorer for Box<S> {
    fn score(&self, mention: &Mention, candidates: &[&Entity<'_>]) -> Result<Vec<f64>> {
        (**self).score(mention, candidates)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// =============================================================================
// Baselines
// =============================================================================

/// Always prefers starting a new entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewEntityScorer;

impl ActionScorer for NewEntityScorer {
    fn score(&self, _mention: &Mention, candidates: &[&Entity<'_>]) -> Result<Vec<f64>> {
        let mut scores = vec![0.0; candidates.len() + 1];
        scores[0] = 1.0;
        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "new-entity"
    }
}

/// Prefers the first (most recent) candidate, and a new entity only when
/// there is none.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestCandidateScorer;

impl ActionScorer for NearestCandidateScorer {
    fn score(&self, _mention: &Mention, candidates: &[&Entity<'_>]) -> Result<Vec<f64>> {
        let mut scores = Vec::with_capacity(candidates.len() + 1);
        scores.push(0.0);
        scores.extend((1..=candidates.len()).map(|i| 1.0 / i as f64));
        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "nearest"
    }
}

/// Links a mention to an entity that already contains its head word.
///
/// A matching candidate scores 1, a non-matching one 0, and a new entity
/// `new_entity_score`. With the default of 0.5 the most recent matching
/// entity wins and unmatched mentions start new entities.
#[derive(Debug, Clone, Copy)]
pub struct HeadMatchScorer {
    new_entity_score: f64,
}

impl HeadMatchScorer {
    /// Create a head-match scorer.
    #[must_use]
    pub fn new(new_entity_score: f64) -> Self {
        Self { new_entity_score }
    }
}

impl Default for HeadMatchScorer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl ActionScorer for HeadMatchScorer {
    fn score(&self, mention: &Mention, candidates: &[&Entity<'_>]) -> Result<Vec<f64>> {
        let head = mention.head_form.to_lowercase();
        let mut scores = Vec::with_capacity(candidates.len() + 1);
        scores.push(self.new_entity_score);
        for entity in candidates {
            let matches = entity
                .mentions()
                .iter()
                .any(|m| m.head_form.to_lowercase() == head);
            scores.push(if matches { 1.0 } else { 0.0 });
        }
        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "head-match"
    }
}

/// Scores links by cosine similarity between the mention's head vector and
/// the centroid of the candidate's head vectors.
#[derive(Debug, Clone)]
pub struct VectorScorer<V> {
    vectors: V,
    new_entity_score: f64,
    fallback: FallbackPolicy,
}

impl<V: WordVectors> VectorScorer<V> {
    /// Create a vector scorer owning its vector table.
    #[must_use]
    pub fn new(vectors: V, new_entity_score: f64) -> Self {
        Self {
            vectors,
            new_entity_score,
            fallback: FallbackPolicy::default(),
        }
    }

    /// Set the policy for words without a vector.
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    fn head_vector(&self, mention: &Mention) -> Result<Vec<f32>> {
        Ok(self.fallback.lookup(&self.vectors, &mention.head_form)?)
    }
}

impl<V: WordVectors> ActionScorer for VectorScorer<V> {
    fn score(&self, mention: &Mention, candidates: &[&Entity<'_>]) -> Result<Vec<f64>> {
        let target = self.head_vector(mention)?;
        let mut scores = Vec::with_capacity(candidates.len() + 1);
        scores.push(self.new_entity_score);

        for entity in candidates {
            let members = entity
                .mentions()
                .iter()
                .map(|m| self.head_vector(m))
                .collect::<Result<Vec<_>>>()?;
            let center = centroid(&members, self.vectors.dimension());
            scores.push(cosine(&target, &center));
        }
        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "vectors"
    }
}

/// Build one of the baseline scorers from configuration.
///
/// # Errors
///
/// Returns [`Error::Config`] when the vector scorer is requested without a
/// vector table.
pub fn build_scorer<V: WordVectors + 'static>(
    config: &ScorerConfig,
    vectors: Option<V>,
) -> Result<Box<dyn ActionScorer>> {
    let scorer: Box<dyn ActionScorer> = match config.kind {
        ScorerKind::NewEntity => Box::new(NewEntityScorer),
        ScorerKind::Nearest => Box::new(NearestCandidateScorer),
        ScorerKind::HeadMatch => Box::new(HeadMatchScorer::new(config.new_entity_score)),
        ScorerKind::Vectors => {
            let vectors = vectors
                .ok_or_else(|| Error::config("the vectors scorer needs a word vector table"))?;
            Box::new(
                VectorScorer::new(vectors, config.new_entity_score)
                    .with_fallback(config.fallback),
            )
        }
    };
    log::debug!("using {} scorer", scorer.name());
    Ok(scorer)
}
