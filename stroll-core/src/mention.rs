//! Mentions and the documents that own them.
//!
//! A [`Mention`] is a head word that an upstream extraction stage picked out of
//! a parsed sentence. Mentions are grouped into a [`Document`] in textual order
//! and are read-only input to resolution, except for the system cluster id
//! written back by [`Document::annotate`].
//!
//! # Example
//!
//! ```rust
//! use stroll_core::{Document, Mention, MentionId, Sentence};
//!
//! let mut doc = Document::new("wiki-42", 0);
//! doc.push_sentence(Sentence::new(vec!["Marie".into(), "sliep".into()]));
//! doc.push_mention(Mention::new(MentionId::new(0, 0, 0), "Marie").with_refid("e1"));
//!
//! assert!(doc.validate().is_ok());
//! assert_eq!(doc.gold_partition()?.len(), 1);
//! # Ok::<(), stroll_core::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::partition::Partition;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

// =============================================================================
// MentionId
// =============================================================================

/// Stable identifier of a mention: document rank, sentence rank, head token.
///
/// Ordering follows document order, which makes `MentionId` usable as a
/// partition key with a deterministic iteration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MentionId {
    /// Rank of the document within its corpus.
    pub doc_rank: usize,
    /// Rank of the sentence within the document.
    pub sent_rank: usize,
    /// Index of the head token within the sentence (0-based).
    pub head: usize,
}

impl MentionId {
    /// Create a new identifier.
    #[must_use]
    pub const fn new(doc_rank: usize, sent_rank: usize, head: usize) -> Self {
        Self {
            doc_rank,
            sent_rank,
            head,
        }
    }
}

impl fmt::Display for MentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.doc_rank, self.sent_rank, self.head)
    }
}

// =============================================================================
// Sentence
// =============================================================================

/// Token context a mention was extracted from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Optional upstream sentence identifier (e.g. a CoNLL-U `sent_id`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_id: Option<String>,
    /// Surface forms of the tokens.
    pub tokens: Vec<String>,
}

impl Sentence {
    /// Create a sentence from its tokens.
    #[must_use]
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            sent_id: None,
            tokens,
        }
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the sentence has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// =============================================================================
// Mention
// =============================================================================

/// A single reference to an entity, identified by its head token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// Stable identifier.
    pub id: MentionId,
    /// Surface form of the head token.
    pub head_form: String,
    /// Gold cluster label, if the document is annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refid: Option<String>,
    /// Features consumed by action scorers (UPOS, FEATS, DEPREL, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, String>,
    /// System cluster assigned by resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
}

impl Mention {
    /// Create an unlabelled mention.
    #[must_use]
    pub fn new(id: MentionId, head_form: impl Into<String>) -> Self {
        Self {
            id,
            head_form: head_form.into(),
            refid: None,
            features: BTreeMap::new(),
            cluster: None,
        }
    }

    /// Attach a gold cluster label.
    #[must_use]
    pub fn with_refid(mut self, refid: impl Into<String>) -> Self {
        self.refid = Some(refid.into());
        self
    }

    /// Attach a scorer feature.
    #[must_use]
    pub fn with_feature(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.features.insert(name.into(), value.into());
        self
    }

    /// Rank of the sentence this mention comes from.
    #[must_use]
    pub fn sent_rank(&self) -> usize {
        self.id.sent_rank
    }

    /// Look up a feature value.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<&str> {
        self.features.get(name).map(String::as_str)
    }
}

impl fmt::Display for Mention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" [{}]", self.head_form, self.id)
    }
}

// =============================================================================
// Document
// =============================================================================

/// Mentions of one document in textual order, with their sentences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    pub doc_id: String,
    /// Rank of the document within its corpus.
    #[serde(default)]
    pub rank: usize,
    /// Sentences, indexed by sentence rank.
    #[serde(default)]
    pub sentences: Vec<Sentence>,
    /// Mentions in textual order.
    pub mentions: Vec<Mention>,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new(doc_id: impl Into<String>, rank: usize) -> Self {
        Self {
            doc_id: doc_id.into(),
            rank,
            sentences: Vec::new(),
            mentions: Vec::new(),
        }
    }

    /// Append a sentence; returns its rank.
    pub fn push_sentence(&mut self, sentence: Sentence) -> usize {
        self.sentences.push(sentence);
        self.sentences.len() - 1
    }

    /// Append a mention at the end of the document.
    pub fn push_mention(&mut self, mention: Mention) {
        self.mentions.push(mention);
    }

    /// Number of mentions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// Whether the document has no mentions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Sentence a mention was extracted from.
    #[must_use]
    pub fn sentence_of(&self, mention: &Mention) -> Option<&Sentence> {
        self.sentences.get(mention.sent_rank())
    }

    /// Whether any mention carries a gold label.
    #[must_use]
    pub fn has_gold(&self) -> bool {
        self.mentions.iter().any(|m| m.refid.is_some())
    }

    /// Identifiers of all mentions, in document order.
    pub fn mention_ids(&self) -> impl Iterator<Item = MentionId> + '_ {
        self.mentions.iter().map(|m| m.id)
    }

    /// Check the document invariants.
    ///
    /// Mentions must belong to this document, be in non-decreasing sentence
    /// order, have unique identifiers, and (when sentences are present) point
    /// at an existing sentence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.mentions.len());
        let mut last_sent = 0;

        for mention in &self.mentions {
            let id = mention.id;
            if id.doc_rank != self.rank {
                return Err(Error::invalid_document(
                    &self.doc_id,
                    format!("mention {id} has doc rank {}, expected {}", id.doc_rank, self.rank),
                ));
            }
            if id.sent_rank < last_sent {
                return Err(Error::invalid_document(
                    &self.doc_id,
                    format!("mention {id} is out of textual order"),
                ));
            }
            if !self.sentences.is_empty() && id.sent_rank >= self.sentences.len() {
                return Err(Error::invalid_document(
                    &self.doc_id,
                    format!(
                        "mention {id} refers to sentence {} of {}",
                        id.sent_rank,
                        self.sentences.len()
                    ),
                ));
            }
            if !seen.insert(id) {
                return Err(Error::invalid_document(
                    &self.doc_id,
                    format!("duplicate mention {id}"),
                ));
            }
            last_sent = id.sent_rank;
        }
        Ok(())
    }

    /// Gold partition derived from the mentions' `refid` labels.
    ///
    /// Mentions without a label become singletons. Clusters are ordered by
    /// the first occurrence of their label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OverlappingClusters`] if a mention identifier repeats.
    pub fn gold_partition(&self) -> Result<Partition<MentionId>> {
        let mut clusters: Vec<Vec<MentionId>> = Vec::new();
        let mut by_label: HashMap<&str, usize> = HashMap::new();

        for mention in &self.mentions {
            match mention.refid.as_deref() {
                Some(label) => {
                    let idx = *by_label.entry(label).or_insert_with(|| {
                        clusters.push(Vec::new());
                        clusters.len() - 1
                    });
                    clusters[idx].push(mention.id);
                }
                None => clusters.push(vec![mention.id]),
            }
        }

        Partition::new(clusters)
    }

    /// Write system cluster ids back onto the mentions.
    ///
    /// Every mention found in `partition` gets the index of its cluster;
    /// mentions not covered are reset to `None`. Returns the number of
    /// mentions annotated.
    pub fn annotate(&mut self, partition: &Partition<MentionId>) -> usize {
        let index = partition.cluster_index();
        let mut annotated = 0;
        for mention in &mut self.mentions {
            mention.cluster = index.get(&mention.id).copied();
            if mention.cluster.is_some() {
                annotated += 1;
            }
        }
        annotated
    }
}

// =============================================================================
// Tests
// =============================================================================
