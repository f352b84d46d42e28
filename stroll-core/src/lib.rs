//! # stroll-core
//!
//! Core types for the stroll coreference toolbox, shared by every crate in
//! the workspace.
//!
//! This crate provides:
//! - **Mention model**: `MentionId`, `Mention`, `Sentence`, `Document`
//! - **Entity store**: `Entity`, `EntityStore`
//! - **Partitions**: `Partition`, the common currency of resolution and scoring

#![warn(missing_docs)]

pub mod entity;
pub mod error;
pub mod mention;
pub mod partition;

pub use entity::{Entity, EntityStore};
pub use error::{Error, Result};
pub use mention::{Document, Mention, MentionId, Sentence};
pub use partition::{MentionKey, Partition};
