//! JSON checkpoint document and its file-backed store

use crate::config::Section;
use crate::state::CrawlState;
use crate::storage::{write_atomically, CheckpointStore, StorageError, StorageResult};
use crate::url::{canonicalize, DocUrl};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted snapshot of crawl progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub scraped_count: u32,

    /// Name of the section being crawled when the snapshot was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_section: Option<String>,

    /// Human-readable `index/total` of the current section (1-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_progress: Option<String>,

    /// Zero-based index of the current section, used to resume
    #[serde(default)]
    pub current_section_index: usize,

    pub visited: Vec<DocUrl>,
    pub failed: Vec<DocUrl>,

    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    // ===== Present once the run has finished =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

impl Checkpoint {
    /// Snapshot of an in-progress crawl
    pub fn progress(state: &CrawlState, sections: &[Section], config_hash: Option<&str>) -> Self {
        let index = state.current_section_index();
        Self {
            scraped_count: state.scraped_count(),
            current_section: sections.get(index).map(|s| s.name.clone()),
            section_progress: Some(format!("{}/{}", index + 1, sections.len())),
            current_section_index: index,
            visited: state.visited().iter().cloned().collect(),
            failed: state.failed().iter().cloned().collect(),
            last_updated: Utc::now(),
            config_hash: config_hash.map(str::to_string),
            sections: None,
            completed: false,
            completion_time: None,
        }
    }

    /// Final snapshot of a finished crawl
    pub fn completed(state: &CrawlState, sections: &[Section], config_hash: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            current_section: None,
            section_progress: None,
            sections: Some(sections.to_vec()),
            completed: true,
            completion_time: Some(now),
            last_updated: now,
            ..Self::progress(state, sections, config_hash)
        }
    }

    /// Rebuilds the crawl state this checkpoint describes
    ///
    /// URLs are canonicalized again so hand-edited documents still dedup.
    pub fn to_state(&self) -> CrawlState {
        CrawlState::restore(
            self.visited.iter().map(|u| canonicalize(u.as_str())),
            self.failed.iter().map(|u| canonicalize(u.as_str())),
            self.scraped_count,
            self.current_section_index,
        )
    }
}

/// Stores the checkpoint as a pretty-printed JSON file
pub struct JsonCheckpointStore {
    path: PathBuf,
    last_saved: Option<u32>,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_saved: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> StorageResult<Option<Checkpoint>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&mut self, checkpoint: &Checkpoint) -> StorageResult<()> {
        if let Some(previous) = self.last_saved {
            if checkpoint.scraped_count < previous {
                return Err(StorageError::NonMonotonic {
                    previous,
                    next: checkpoint.scraped_count,
                });
            }
        }

        let json = serde_json::to_string_pretty(checkpoint)?;
        write_atomically(&self.path, json.as_bytes())?;
        self.last_saved = Some(checkpoint.scraped_count);

        tracing::debug!(
            "Checkpoint saved to {} ({} scraped, {} visited)",
            self.path.display(),
            checkpoint.scraped_count,
            checkpoint.visited.len()
        );
        Ok(())
    }
}
