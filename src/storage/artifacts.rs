//! File-backed artifact store with collision handling

use crate::config::CollisionPolicy;
use crate::output::{parse_frontmatter, Artifact};
use crate::storage::{write_atomically, ArtifactStore, StorageError, StorageResult};
use crate::url::{slugify, DocUrl};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Writes one file per artifact into a directory
pub struct FsArtifactStore {
    dir: PathBuf,
    policy: CollisionPolicy,
    /// Source URL owning each filename written by this store
    owners: HashMap<String, DocUrl>,
}

impl FsArtifactStore {
    /// Opens the store, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>, policy: CollisionPolicy) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            policy,
            owners: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Picks the filename an artifact is written under
    fn resolve_filename(&self, artifact: &Artifact, section: &str) -> String {
        match self.policy {
            CollisionPolicy::Overwrite => artifact.filename.clone(),
            CollisionPolicy::SectionPrefix => {
                let prefix = slugify(&section.to_lowercase());
                if prefix.is_empty() {
                    artifact.filename.clone()
                } else {
                    format!("{}_{}", prefix, artifact.filename)
                }
            }
            CollisionPolicy::Suffix => {
                let (stem, ext) = split_extension(&artifact.filename);
                let mut candidate = artifact.filename.clone();
                let mut n = 1;
                while self.is_owned_by_other(&candidate, &artifact.source_url) {
                    n += 1;
                    candidate = match ext {
                        Some(ext) => format!("{}_{}.{}", stem, n, ext),
                        None => format!("{}_{}", stem, n),
                    };
                }
                candidate
            }
        }
    }

    /// Checks this run's writes, then the file on disk
    fn is_owned_by_other(&self, filename: &str, source_url: &DocUrl) -> bool {
        if let Some(owner) = self.owners.get(filename) {
            return owner != source_url;
        }

        match std::fs::read_to_string(self.dir.join(filename)) {
            Ok(text) => parse_frontmatter(&text)
                .get("source_url")
                .is_some_and(|owner| owner != source_url.as_str()),
            Err(_) => false,
        }
    }
}

fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    }
}

impl ArtifactStore for FsArtifactStore {
    fn write(&mut self, artifact: &Artifact, section: &str) -> StorageResult<String> {
        if artifact.filename.is_empty()
            || artifact.filename.contains('/')
            || artifact.filename.contains('\\')
        {
            return Err(StorageError::InvalidFilename(artifact.filename.clone()));
        }

        let filename = self.resolve_filename(artifact, section);
        if filename != artifact.filename {
            tracing::debug!(
                "Filename {} taken, writing {} as {}",
                artifact.filename,
                artifact.source_url,
                filename
            );
        }

        write_atomically(&self.dir.join(&filename), artifact.render().as_bytes())?;
        self.owners
            .insert(filename.clone(), artifact.source_url.clone());

        Ok(filename)
    }
}
