//! Configuration for resolution and scoring.
//!
//! Configuration is read from TOML. Every field has a default, so an empty
//! file (or no file at all) yields the stock setup: recency ranking with 20
//! candidates and the head-match baseline scorer.
//!
//! ```toml
//! parallel = false
//!
//! [resolver]
//! max_candidates = 20
//! record_trace = true
//!
//! [scorer]
//! kind = "head-match"
//! new_entity_score = 0.5
//! fallback = "zero-vector"
//! ```

use crate::error::{Error, Result};
use crate::vectors::FallbackPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default bound on the number of link candidates per mention.
pub const DEFAULT_MAX_CANDIDATES: usize = 20;

/// Settings for the decision procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum number of entities offered to the scorer for one mention.
    pub max_candidates: usize,
    /// Keep the per-decision trace on the resolution.
    pub record_trace: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_candidates: DEFAULT_MAX_CANDIDATES,
            record_trace: true,
        }
    }
}

impl ResolverConfig {
    /// Set the candidate bound.
    #[must_use]
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Width of the action vector: one slot per candidate plus "new entity".
    #[must_use]
    pub fn action_width(&self) -> usize {
        self.max_candidates + 1
    }
}

/// Built-in action scorers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScorerKind {
    /// Every mention starts a new entity.
    NewEntity,
    /// Every mention links to the most recent entity.
    Nearest,
    /// Link when an entity already holds a mention with the same head word.
    #[default]
    HeadMatch,
    /// Cosine similarity of head-word vectors.
    Vectors,
}

impl std::str::FromStr for ScorerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "new-entity" | "new" => Ok(Self::NewEntity),
            "nearest" => Ok(Self::Nearest),
            "head-match" | "head" => Ok(Self::HeadMatch),
            "vectors" | "vector" => Ok(Self::Vectors),
            other => Err(Error::config(format!("unknown scorer kind '{other}'"))),
        }
    }
}

/// Settings for the built-in scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Which scorer to use.
    pub kind: ScorerKind,
    /// Score given to "start a new entity"; links must beat it.
    pub new_entity_score: f64,
    /// What to do when a head word has no vector.
    pub fallback: FallbackPolicy,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            kind: ScorerKind::default(),
            new_entity_score: 0.5,
            fallback: FallbackPolicy::default(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrollConfig {
    /// Process documents of a corpus in parallel (needs the `parallel` feature).
    pub parallel: bool,
    /// Decision procedure settings.
    pub resolver: ResolverConfig,
    /// Scorer settings.
    pub scorer: ScorerConfig,
}

impl StrollConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, [`Error::Config`] if
    /// it does not describe a valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        log::debug!("loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a non-finite `new_entity_score`.
    pub fn validate(&self) -> Result<()> {
        if !self.scorer.new_entity_score.is_finite() {
            return Err(Error::config("scorer.new_entity_score must be finite"));
        }
        if self.resolver.max_candidates == 0 {
            log::warn!("max_candidates = 0: every mention will start a new entity");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StrollConfig::default();
        assert_eq!(config.resolver.max_candidates, DEFAULT_MAX_CANDIDATES);
        assert_eq!(config.resolver.action_width(), 21);
        assert_eq!(config.scorer.kind, ScorerKind::HeadMatch);
        assert!(!config.parallel);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = StrollConfig::from_toml_str("").unwrap();
        assert_eq!(config, StrollConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = StrollConfig::from_toml_str(
            r#"
            parallel = true

            [resolver]
            max_candidates = 5

            [scorer]
            kind = "vectors"
            fallback = "fail"
            "#,
        )
        .unwrap();
        assert!(config.parallel);
        assert_eq!(config.resolver.max_candidates, 5);
        assert!(config.resolver.record_trace);
        assert_eq!(config.scorer.kind, ScorerKind::Vectors);
        assert_eq!(config.scorer.fallback, FallbackPolicy::Fail);
        assert!((config.scorer.new_entity_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_toml() {
        let err = StrollConfig::from_toml_str("[resolver]\nmax_candidates = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = StrollConfig {
            resolver: ResolverConfig::default().with_max_candidates(7),
            ..StrollConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(StrollConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_scorer_kind_from_str() {
        assert_eq!("head".parse::<ScorerKind>().unwrap(), ScorerKind::HeadMatch);
        assert_eq!("new_entity".parse::<ScorerKind>().unwrap(), ScorerKind::NewEntity);
        assert!("neural".parse::<ScorerKind>().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stroll.toml");
        std::fs::write(&path, "[resolver]\nmax_candidates = 3\n").unwrap();
        let config = StrollConfig::from_file(&path).unwrap();
        assert_eq!(config.resolver.max_candidates, 3);

        assert!(matches!(
            StrollConfig::from_file(dir.path().join("missing.toml")),
            Err(Error::Io(_))
        ));
    }
}
