//! Error types for stroll-core.

use thiserror::Error;

/// Result type for stroll-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for stroll-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A document violates its ordering or identifier invariants.
    #[error("Invalid document {doc_id}: {reason}")]
    InvalidDocument {
        /// Document identifier.
        doc_id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A mention identifier occurs in more than one cluster.
    #[error("Invalid partition: mention {0} occurs in more than one cluster")]
    OverlappingClusters(String),

    /// Gold and system partitions do not cover the same mentions.
    #[error(
        "Unaligned partitions: {gold_only} mention(s) only in gold, \
         {system_only} only in system (first: {example})"
    )]
    UnalignedPartitions {
        /// Mentions present in the gold partition but not the system one.
        gold_only: usize,
        /// Mentions present in the system partition but not the gold one.
        system_only: usize,
        /// One offending mention, for diagnostics.
        example: String,
    },

    /// Reference to an entity rank that was never created.
    #[error("Unknown entity rank {rank} (store holds {len} entities)")]
    UnknownEntity {
        /// Requested rank.
        rank: usize,
        /// Number of entities in the store.
        len: usize,
    },
}

impl Error {
    /// Create an invalid document error.
    #[must_use]
    pub fn invalid_document(doc_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            doc_id: doc_id.into(),
            reason: reason.into(),
        }
    }
}
