//! Storage traits and error types
//!
//! This module defines the trait interfaces for the checkpoint and artifact
//! backends and their shared error type.

use crate::output::Artifact;
use crate::storage::Checkpoint;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checkpoint regression: scraped_count {next} after {previous}")]
    NonMonotonic { previous: u32, next: u32 },

    #[error("Invalid artifact filename: {0}")]
    InvalidFilename(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for crawl progress
///
/// A store holds a single checkpoint document. Saving replaces it
/// atomically: readers see either the previous or the new document.
pub trait CheckpointStore: Send {
    /// Loads the current checkpoint, if one exists
    fn load(&self) -> StorageResult<Option<Checkpoint>>;

    /// Replaces the checkpoint
    ///
    /// # Errors
    ///
    /// Fails with [`StorageError::NonMonotonic`] when `checkpoint` reports
    /// fewer scrapes than the last checkpoint saved through this store.
    fn save(&mut self, checkpoint: &Checkpoint) -> StorageResult<()>;
}

/// Persistence for page artifacts
pub trait ArtifactStore: Send {
    /// Writes an artifact
    ///
    /// # Arguments
    ///
    /// * `artifact` - The artifact to write
    /// * `section` - Name of the section the page was scraped under
    ///
    /// # Returns
    ///
    /// The filename actually written, after the collision policy applied
    fn write(&mut self, artifact: &Artifact, section: &str) -> StorageResult<String>;
}
