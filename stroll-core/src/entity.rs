//! Entities and the per-document entity store.
//!
//! An [`Entity`] is an append-only cluster of mentions with a rank fixed at
//! creation. The [`EntityStore`] owns every entity built while one document is
//! resolved; entities borrow their mentions from the document, so a store
//! cannot outlive the document it was built from.

use crate::error::{Error, Result};
use crate::mention::{Mention, MentionId};
use crate::partition::Partition;
use std::collections::BTreeSet;

/// A cluster of mentions judged to co-refer.
///
/// # Invariants
///
/// - Holds at least one mention (creation takes the first one)
/// - Mentions are only ever appended, in resolution order
/// - `rank` never changes
#[derive(Debug, Clone, PartialEq)]
pub struct Entity<'d> {
    rank: usize,
    mentions: Vec<&'d Mention>,
    recency: usize,
}

impl<'d> Entity<'d> {
    fn new(rank: usize, first: &'d Mention) -> Self {
        Self {
            rank,
            mentions: vec![first],
            recency: first.sent_rank(),
        }
    }

    fn push(&mut self, mention: &'d Mention) {
        self.recency = mention.sent_rank();
        self.mentions.push(mention);
    }

    /// Creation rank.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Mentions in the order they were added.
    #[must_use]
    pub fn mentions(&self) -> &[&'d Mention] {
        &self.mentions
    }

    /// Most recently added mention.
    #[must_use]
    pub fn last_mention(&self) -> Option<&'d Mention> {
        self.mentions.last().copied()
    }

    /// Sentence rank of the most recently added mention.
    #[must_use]
    pub fn recency(&self) -> usize {
        self.recency
    }

    /// Number of mentions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// Whether the entity has no mentions; never true for a stored entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Identifiers of the member mentions.
    #[must_use]
    pub fn as_set(&self) -> BTreeSet<MentionId> {
        self.mentions.iter().map(|m| m.id).collect()
    }
}

/// The evolving clustering of one document.
///
/// Not shared between threads: resolution of a document is a sequential fold
/// and each document gets its own store.
#[derive(Debug, Clone, Default)]
pub struct EntityStore<'d> {
    entities: Vec<Entity<'d>>,
}

impl<'d> EntityStore<'d> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new entity holding `first`; returns its rank.
    pub fn create(&mut self, first: &'d Mention) -> usize {
        let rank = self.entities.len();
        self.entities.push(Entity::new(rank, first));
        rank
    }

    /// Append a mention to an existing entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEntity`] if no entity has that rank.
    pub fn append(&mut self, rank: usize, mention: &'d Mention) -> Result<()> {
        let len = self.entities.len();
        let entity = self
            .entities
            .get_mut(rank)
            .ok_or(Error::UnknownEntity { rank, len })?;
        entity.push(mention);
        Ok(())
    }

    /// Entity with the given rank.
    #[must_use]
    pub fn get(&self, rank: usize) -> Option<&Entity<'d>> {
        self.entities.get(rank)
    }

    /// All entities, ordered by rank.
    #[must_use]
    pub fn all(&self) -> &[Entity<'d>] {
        &self.entities
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity was created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Total number of mentions assigned.
    #[must_use]
    pub fn mention_count(&self) -> usize {
        self.entities.iter().map(Entity::len).sum()
    }

    /// System partition, one cluster per entity in rank order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OverlappingClusters`] if a mention was added twice.
    pub fn partition(&self) -> Result<Partition<MentionId>> {
        Partition::new(self.entities.iter().map(Entity::as_set))
    }
}
