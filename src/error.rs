//! Error types for stroll.

use crate::vectors::AlignmentError;
use thiserror::Error;

/// Result type for stroll operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for stroll operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The action scorer returned a malformed score vector.
    #[error("Invalid score for document {doc_id}: {reason}")]
    InvalidScore {
        /// Document being resolved.
        doc_id: String,
        /// What was wrong with the scores.
        reason: String,
    },

    /// The action scorer itself failed.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Word vector lookup failed and the fallback policy forbids substitution.
    #[error("Alignment failed: {0}")]
    Alignment(#[from] AlignmentError),

    /// Document, entity or partition invariant violated.
    #[error(transparent)]
    Core(#[from] stroll_core::Error),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Create an invalid score error.
    pub fn invalid_score(doc_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidScore {
            doc_id: doc_id.into(),
            reason: reason.into(),
        }
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Error::Inference(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_build_matching_variants() {
        let err = Error::invalid_score("d1", "width 3, expected 4");
        assert!(matches!(err, Error::InvalidScore { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid score for document d1: width 3, expected 4"
        );
        assert!(matches!(Error::inference("x"), Error::Inference(_)));
        assert!(matches!(Error::config("x"), Error::Config(_)));
        assert!(matches!(Error::parse("x"), Error::Parse(_)));
    }

    #[test]
    fn test_core_error_is_transparent() {
        let core = stroll_core::Error::invalid_document("d2", "duplicate mention");
        let err: Error = core.clone().into();
        assert_eq!(err.to_string(), core.to_string());
    }
}
