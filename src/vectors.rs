//! Word vectors as an injected capability.
//!
//! Scorers that compare head words by embedding receive a [`WordVectors`]
//! implementation explicitly; there is no process-wide vector table. A failed
//! lookup is an [`AlignmentError`], and the caller's [`FallbackPolicy`]
//! decides whether it becomes a zero vector or an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Why a word could not be mapped to a vector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AlignmentError {
    /// The word is not in the vocabulary.
    #[error("no vector for '{0}'")]
    UnknownWord(String),

    /// The stored vector has the wrong dimension.
    #[error("vector for '{word}' has dimension {found}, expected {expected}")]
    DimensionMismatch {
        /// Offending word.
        word: String,
        /// Dimension of the table.
        expected: usize,
        /// Dimension found.
        found: usize,
    },

    /// Empty input word.
    #[error("empty word")]
    EmptyWord,
}

/// Lookup of dense vectors for words.
pub trait WordVectors: Send + Sync {
    /// Dimension of every vector returned.
    fn dimension(&self) -> usize;

    /// Vector for `word`.
    fn lookup(&self, word: &str) -> Result<Vec<f32>, AlignmentError>;
}

/// What to do when a lookup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Substitute a zero vector and log the failure.
    #[default]
    ZeroVector,
    /// Propagate the failure.
    Fail,
}

impl FallbackPolicy {
    /// Look up `word`, applying the policy on failure.
    ///
    /// # Errors
    ///
    /// Returns the lookup error under [`FallbackPolicy::Fail`].
    pub fn lookup(
        self,
        vectors: &dyn WordVectors,
        word: &str,
    ) -> Result<Vec<f32>, AlignmentError> {
        match (vectors.lookup(word), self) {
            (Ok(v), _) => Ok(v),
            (Err(e), FallbackPolicy::ZeroVector) => {
                log::debug!("alignment failed ({e}); using zero vector");
                Ok(vec![0.0; vectors.dimension()])
            }
            (Err(e), FallbackPolicy::Fail) => Err(e),
        }
    }
}

/// In-memory vector table keyed by lowercased word.
#[derive(Debug, Clone, Default)]
pub struct StaticVectors {
    dimension: usize,
    table: HashMap<String, Vec<f32>>,
}

impl StaticVectors {
    /// Create an empty table of the given dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            table: HashMap::new(),
        }
    }

    /// Add a vector.
    ///
    /// # Errors
    ///
    /// Returns [`AlignmentError::DimensionMismatch`] if the vector does not
    /// match the table dimension.
    pub fn insert(&mut self, word: &str, vector: Vec<f32>) -> Result<(), AlignmentError> {
        if word.is_empty() {
            return Err(AlignmentError::EmptyWord);
        }
        if vector.len() != self.dimension {
            return Err(AlignmentError::DimensionMismatch {
                word: word.to_string(),
                expected: self.dimension,
                found: vector.len(),
            });
        }
        self.table.insert(word.to_lowercase(), vector);
        Ok(())
    }

    /// Read a JSON object mapping words to arrays of numbers.
    ///
    /// The dimension is taken from the first entry (in sorted word order).
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON and an alignment error for
    /// inconsistent dimensions.
    pub fn from_json_reader(reader: impl Read) -> crate::Result<Self> {
        let raw: HashMap<String, Vec<f32>> = serde_json::from_reader(reader)
            .map_err(|e| crate::Error::parse(format!("word vectors: {e}")))?;

        let mut words: Vec<_> = raw.into_iter().collect();
        words.sort_by(|a, b| a.0.cmp(&b.0));
        let dimension = words.first().map_or(0, |(_, v)| v.len());

        let mut vectors = Self::new(dimension);
        for (word, vector) in words {
            vectors.insert(&word, vector)?;
        }
        Ok(vectors)
    }

    /// Read a JSON vector file.
    ///
    /// # Errors
    ///
    /// See [`StaticVectors::from_json_reader`]; IO errors are propagated.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let file = File::open(path.as_ref())?;
        let vectors = Self::from_json_reader(BufReader::new(file))?;
        log::info!(
            "loaded {} word vectors (dim {}) from {}",
            vectors.len(),
            vectors.dimension,
            path.as_ref().display()
        );
        Ok(vectors)
    }

    /// Number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl WordVectors for StaticVectors {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn lookup(&self, word: &str) -> Result<Vec<f32>, AlignmentError> {
        if word.is_empty() {
            return Err(AlignmentError::EmptyWord);
        }
        self.table
            .get(&word.to_lowercase())
            .cloned()
            .ok_or_else(|| AlignmentError::UnknownWord(word.to_string()))
    }
}

/// Cosine similarity; 0 when either vector has zero norm.
#[must_use]
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}

/// Element-wise mean of equally sized vectors.
#[must_use]
pub fn centroid(vectors: &[Vec<f32>], dimension: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; dimension];
    if vectors.is_empty() {
        return sum;
    }
    for v in vectors {
        for (s, x) in sum.iter_mut().zip(v) {
            *s += x;
        }
    }
    let n = vectors.len() as f32;
    sum.iter_mut().for_each(|s| *s /= n);
    sum
}
