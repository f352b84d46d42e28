//! Corpus-level resolution and scoring.
//!
//! Each document is resolved with its own entity store and scored against
//! the gold partition derived from its `refid` labels. A document that fails
//! (malformed input, bad scores, unaligned partitions) is recorded as a
//! [`DocumentFailure`] and contributes nothing to the aggregate; the rest of
//! the corpus is still scored.
//!
//! Aggregate scores are micro-averaged: metric sums are added over documents
//! and divided once.

use super::coref_metrics::{CorefCounts, CorefEvaluation};
use crate::config::{ResolverConfig, StrollConfig};
use crate::error::Result;
use crate::resolver::EntityResolver;
use crate::scorer::ActionScorer;
use serde::Serialize;
use std::fmt;
use stroll_core::{Document, MentionId, Partition};

/// Scores for one successfully resolved document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Position of the document in the input.
    pub index: usize,
    /// Document identifier.
    pub doc_id: String,
    /// Scores against gold.
    pub evaluation: CorefEvaluation,
    /// Metric sums behind `evaluation`.
    pub counts: CorefCounts,
    /// Number of mentions.
    pub mention_count: usize,
    /// Number of entities built.
    pub entity_count: usize,
    /// Decision trace (empty when tracing is off).
    pub trace: String,
    /// System clusters, one per entity in rank order.
    pub system: Partition<MentionId>,
}

/// A document that could not be resolved or scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    /// Position of the document in the input.
    pub index: usize,
    /// Document identifier.
    pub doc_id: String,
    /// Rendered error.
    pub error: String,
}

/// Aggregate over a corpus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusReport {
    /// Micro-averaged scores over the successful documents.
    pub evaluation: CorefEvaluation,
    /// Summed metric counts.
    pub counts: CorefCounts,
    /// Successful documents, in input order.
    pub documents: Vec<DocumentReport>,
    /// Failed documents, in input order.
    pub failures: Vec<DocumentFailure>,
}

impl CorpusReport {
    fn from_outcomes(outcomes: Vec<(usize, String, Result<DocumentReport>)>) -> Self {
        let mut report = Self::default();
        for (index, doc_id, outcome) in outcomes {
            match outcome {
                Ok(doc) => {
                    report.counts += doc.counts;
                    report.documents.push(doc);
                }
                Err(e) => {
                    log::warn!("document {doc_id} failed: {e}");
                    report.failures.push(DocumentFailure {
                        index,
                        doc_id,
                        error: e.to_string(),
                    });
                }
            }
        }
        report.evaluation = report.counts.evaluation();
        report
    }

    /// Number of documents attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.documents.len() + self.failures.len()
    }

    /// Whether every document was scored.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for CorpusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Corpus: {} documents scored, {} failed",
            self.documents.len(),
            self.failures.len()
        )?;
        write!(f, "{}", self.evaluation)
    }
}

/// Resolves and scores documents, isolating per-document failures.
#[derive(Debug, Clone, Default)]
pub struct CorpusEvaluator {
    resolver: EntityResolver,
    parallel: bool,
}

impl CorpusEvaluator {
    /// Evaluator with the given resolver settings, processing sequentially.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            resolver: EntityResolver::new(config),
            parallel: false,
        }
    }

    /// Evaluator from the top-level configuration.
    #[must_use]
    pub fn from_config(config: &StrollConfig) -> Self {
        Self::new(config.resolver.clone()).with_parallel(config.parallel)
    }

    /// Process documents on the rayon pool (needs the `parallel` feature).
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Resolve and score a single document.
    ///
    /// # Errors
    ///
    /// Returns any resolution or scoring error for this document.
    pub fn evaluate_document<S>(&self, document: &Document, scorer: &S) -> Result<DocumentReport>
    where
        S: ActionScorer + ?Sized,
    {
        self.evaluate_at(0, document, scorer)
    }

    fn evaluate_at<S>(&self, index: usize, document: &Document, scorer: &S) -> Result<DocumentReport>
    where
        S: ActionScorer + ?Sized,
    {
        let resolution = self.resolver.resolve(document, scorer)?;
        let system = resolution.partition()?;
        let gold = document.gold_partition()?;
        let counts = CorefCounts::from_partitions(&gold, &system)?;

        Ok(DocumentReport {
            index,
            doc_id: document.doc_id.clone(),
            evaluation: counts.evaluation(),
            counts,
            mention_count: document.len(),
            entity_count: resolution.entities().len(),
            trace: resolution.trace(),
            system,
        })
    }

    /// Resolve and score every document.
    pub fn evaluate<S>(&self, documents: &[Document], scorer: &S) -> CorpusReport
    where
        S: ActionScorer + ?Sized,
    {
        let outcomes = self.run(documents, scorer);
        let report = CorpusReport::from_outcomes(outcomes);
        log::info!(
            "scored {}/{} documents: {}",
            report.documents.len(),
            report.total(),
            report.evaluation.summary_line()
        );
        report
    }

    #[cfg(feature = "parallel")]
    fn run<S>(&self, documents: &[Document], scorer: &S) -> Vec<(usize, String, Result<DocumentReport>)>
    where
        S: ActionScorer + ?Sized,
    {
        use rayon::prelude::*;

        let one = |(index, doc): (usize, &Document)| {
            (index, doc.doc_id.clone(), self.evaluate_at(index, doc, scorer))
        };
        if self.parallel {
            documents.par_iter().enumerate().map(one).collect()
        } else {
            documents.iter().enumerate().map(one).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run<S>(&self, documents: &[Document], scorer: &S) -> Vec<(usize, String, Result<DocumentReport>)>
    where
        S: ActionScorer + ?Sized,
    {
        if self.parallel {
            log::warn!("parallel evaluation requested but the `parallel` feature is off");
        }
        documents
            .iter()
            .enumerate()
            .map(|(index, doc)| (index, doc.doc_id.clone(), self.evaluate_at(index, doc, scorer)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{HeadMatchScorer, NewEntityScorer};
    use stroll_core::Mention;

    fn doc(id: &str, rank: usize, mentions: &[(&str, &str)]) -> Document {
        let mut d = Document::new(id, rank);
        for (i, &(head, refid)) in mentions.iter().enumerate() {
            d.push_mention(Mention::new(MentionId::new(rank, i, 0), head).with_refid(refid));
        }
        d
    }

    #[test]
    fn test_perfect_document() {
        let d = doc("a", 0, &[("Jan", "1"), ("Marie", "2"), ("Jan", "1")]);
        let report = CorpusEvaluator::default()
            .evaluate_document(&d, &HeadMatchScorer::default())
            .unwrap();
        assert_eq!(report.entity_count, 2);
        assert_eq!(report.mention_count, 3);
        assert!((report.evaluation.conll_f1() - 1.0).abs() < 1e-9);
        assert_eq!(report.trace, "0 1 0L");
    }

    #[test]
    fn test_failures_are_isolated() {
        let good = doc("good", 0, &[("Jan", "1"), ("Jan", "1")]);
        // mention doc_rank does not match the document
        let mut bad = doc("bad", 1, &[("Piet", "1")]);
        bad.mentions[0].id = MentionId::new(7, 0, 0);

        let report =
            CorpusEvaluator::default().evaluate(&[good, bad], &HeadMatchScorer::default());
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].doc_id, "bad");
        assert_eq!(report.failures[0].index, 1);
        assert!(!report.is_complete());
        assert!((report.evaluation.muc.f1 - 1.0).abs() < 1e-9);
        assert!(report.to_string().contains("1 failed"));
    }

    #[test]
    fn test_micro_average() {
        let a = doc("a", 0, &[("x", "1"), ("y", "1")]);
        let b = doc("b", 1, &[("x", "1"), ("y", "1"), ("z", "1")]);
        let report = CorpusEvaluator::default().evaluate(&[a, b], &NewEntityScorer);
        assert_eq!(report.total(), 2);
        // B³ recall: (2 * 1/2 + 3 * 1/3) / 5
        assert!((report.evaluation.b_cubed.recall - 0.4).abs() < 1e-9);
        assert_eq!(report.evaluation.muc.recall, 0.0);
    }

    #[test]
    fn test_empty_corpus() {
        let report = CorpusEvaluator::default().evaluate(&[], &NewEntityScorer);
        assert_eq!(report.total(), 0);
        assert!(report.is_complete());
        assert_eq!(report.evaluation, CorefEvaluation::default());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let docs: Vec<Document> = (0..8)
            .map(|r| doc(&format!("d{r}"), r, &[("a", "1"), ("b", "2"), ("a", "1")]))
            .collect();
        let scorer = HeadMatchScorer::default();
        let seq = CorpusEvaluator::default().evaluate(&docs, &scorer);
        let par = CorpusEvaluator::default()
            .with_parallel(true)
            .evaluate(&docs, &scorer);
        assert_eq!(seq.counts, par.counts);
        let ids: Vec<&str> = par.documents.iter().map(|d| d.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["d0", "d1", "d2", "d3", "d4", "d5", "d6", "d7"]);
    }

    #[test]
    fn test_report_serializes() {
        let d = doc("a", 0, &[("x", "1")]);
        let report = CorpusEvaluator::default().evaluate(&[d], &NewEntityScorer);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["documents"][0]["doc_id"], "a");
        assert!(json["evaluation"]["conll"]["f1"].is_number());
    }
}
