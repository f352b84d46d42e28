//! Coreference evaluation.
//!
//! # Overview
//!
//! - [`coref_metrics`]: MUC, B³, CEAF-e and the CoNLL average over
//!   [`Partition`](stroll_core::Partition)s
//! - [`assignment`]: the exact cluster alignment CEAF-e needs
//! - [`corpus`]: resolve and score a whole corpus, micro-averaged, with
//!   per-document failure isolation
//!
//! # Coreference Evaluation
//!
//! ```rust
//! use stroll::eval::{score_partitions, CorpusEvaluator};
//! use stroll::scorer::HeadMatchScorer;
//! use stroll_core::{Document, Mention, MentionId, Partition};
//!
//! let gold = Partition::new(vec![vec!["a", "b"], vec!["c"]])?;
//! let eval = score_partitions(&gold, &gold)?;
//! assert!((eval.conll_f1() - 1.0).abs() < 1e-9);
//!
//! let mut doc = Document::new("d", 0);
//! doc.push_mention(Mention::new(MentionId::new(0, 0, 0), "Anna").with_refid("1"));
//! doc.push_mention(Mention::new(MentionId::new(0, 1, 0), "Anna").with_refid("1"));
//!
//! let report = CorpusEvaluator::default().evaluate(&[doc], &HeadMatchScorer::default());
//! assert!(report.is_complete());
//! # Ok::<(), stroll::Error>(())
//! ```

pub mod assignment;
pub mod coref_metrics;
pub mod corpus;

pub use assignment::{max_weight_assignment, Assignment};
pub use coref_metrics::{
    b_cubed_score, ceaf_e_score, muc_score, score_partitions, CorefCounts, CorefEvaluation,
    CorefScores, MetricCounts,
};
pub use corpus::{CorpusEvaluator, CorpusReport, DocumentFailure, DocumentReport};
