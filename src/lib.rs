//! # stroll
//!
//! Entity-centric incremental coreference resolution.
//!
//! - **Resolution**: one greedy pass over a document's mentions, linking each
//!   to a recent entity or starting a new one
//! - **Scoring**: pluggable [`ActionScorer`]s, with deterministic baselines
//! - **Evaluation**: MUC, B³, CEAF-e and CoNLL over mention partitions
//!
//! ## Quick Start
//!
//! ```rust
//! use stroll::{resolve, score_partitions, HeadMatchScorer};
//! use stroll::{Document, Mention, MentionId};
//!
//! let mut doc = Document::new("news-1", 0);
//! for (i, (head, refid)) in [("Merkel", "1"), ("Obama", "2"), ("Merkel", "1")]
//!     .into_iter()
//!     .enumerate()
//! {
//!     doc.push_mention(Mention::new(MentionId::new(0, i, 0), head).with_refid(refid));
//! }
//!
//! let system = resolve(&doc, 20, &HeadMatchScorer::default())?;
//! let gold = doc.gold_partition()?;
//! let eval = score_partitions(&gold, &system)?;
//! assert!((eval.conll_f1() - 1.0).abs() < 1e-9);
//! # Ok::<(), stroll::Error>(())
//! ```
//!
//! ## Decision procedure
//!
//! For every mention, in order:
//!
//! 1. rank existing entities by recency of their last mention and keep the
//!    first `max_candidates`
//! 2. score `[new, link 1, .., link k]` with the scorer
//! 3. take the best action (lowest index on ties) and update the store
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! stroll = "0.1"                                         # sequential
//! stroll = { version = "0.1", features = ["parallel"] }  # rayon corpus evaluation
//! ```

#![warn(missing_docs)]

pub mod candidates;
pub mod config;
mod error;
pub mod eval;
pub mod resolver;
pub mod scorer;
pub mod vectors;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use stroll::prelude::*;
    //!
    //! let doc = Document::new("empty", 0);
    //! let resolution = EntityResolver::default().resolve(&doc, &NewEntityScorer).unwrap();
    //! assert!(resolution.entities().is_empty());
    //! ```
    pub use crate::config::{ResolverConfig, ScorerConfig, ScorerKind, StrollConfig};
    pub use crate::error::{Error, Result};
    pub use crate::eval::{score_partitions, CorefEvaluation, CorpusEvaluator};
    pub use crate::resolver::{resolve, EntityResolver, Resolution};
    pub use crate::scorer::{
        ActionScorer, HeadMatchScorer, NearestCandidateScorer, NewEntityScorer, VectorScorer,
    };
    pub use stroll_core::{Document, Mention, MentionId, Partition};
}

// Re-exports
pub use candidates::{CandidateRanker, RecencyRanker};
pub use config::{ResolverConfig, ScorerConfig, ScorerKind, StrollConfig, DEFAULT_MAX_CANDIDATES};
pub use error::{Error, Result};
pub use eval::{
    score_partitions, CorefCounts, CorefEvaluation, CorefScores, CorpusEvaluator, CorpusReport,
};
pub use resolver::{resolve, Action, ActionVector, Decision, EntityResolver, Resolution};
pub use scorer::{
    build_scorer, ActionScorer, HeadMatchScorer, NearestCandidateScorer, NewEntityScorer,
    VectorScorer,
};
pub use vectors::{AlignmentError, FallbackPolicy, StaticVectors, WordVectors};

pub use stroll_core::{
    Document, Entity, EntityStore, Mention, MentionId, MentionKey, Partition, Sentence,
};
