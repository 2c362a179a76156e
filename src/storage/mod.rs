//! Storage module for persisting crawl data
//!
//! This module handles everything the crawl writes to disk:
//! - The JSON checkpoint document used to resume interrupted runs
//! - One artifact file per scraped page, with collision handling
//! - Atomic replacement so interrupted writes never leave partial files

mod artifacts;
mod checkpoint;
mod traits;

pub use artifacts::FsArtifactStore;
pub use checkpoint::{Checkpoint, JsonCheckpointStore};
pub use traits::{ArtifactStore, CheckpointStore, StorageError, StorageResult};

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replaces `path` with `contents` in a single rename
///
/// The data is written to a temporary file in the same directory, flushed,
/// then renamed over the target.
///
/// # Arguments
///
/// * `path` - Destination file; missing parent directories are created
/// * `contents` - Bytes to write
pub fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
