//! Passage Registry: content-addressed record of every passage already used.
//!
//! The registry is a plain value threaded through a run:
//! `load → append* → persist`. Storage sits behind `RegistryStore` so the
//! orchestrator can be exercised against memory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::errors::PipelineError;
use crate::models::passage::{PassageRecord, Registry, SourceRef};
use crate::passages::normalize::{hash_passage, normalize, passage_id, passage_preview};
use crate::storage::write_atomic;

impl PassageRecord {
    /// Builds the record for a passage. The live generator and the backfill
    /// both come through here, so equal passage text always yields the same
    /// hash.
    pub fn from_passage(
        author: &str,
        source: &str,
        source_year: Option<&str>,
        passage: &str,
        entry_date: NaiveDate,
    ) -> Self {
        let passage_hash = hash_passage(&normalize(passage));
        Self {
            id: passage_id(author, source, source_year, &passage_hash),
            author: author.to_string(),
            source: source.to_string(),
            source_year: source_year.map(str::to_string),
            passage_preview: passage_preview(passage),
            passage_hash,
            entry_date,
        }
    }
}

impl Registry {
    pub fn find_by_hash(&self, hash: &str) -> Option<&PassageRecord> {
        self.passages.iter().find(|p| p.passage_hash == hash)
    }

    /// Appends a record and stamps `last_updated`.
    pub fn append(mut self, record: PassageRecord) -> Self {
        self.passages.push(record);
        self.last_updated = Some(Utc::now());
        self
    }

    /// Source works already featured, unique by `(author, source)` in
    /// first-seen order.
    pub fn unique_sources(&self) -> Vec<SourceRef> {
        let mut sources: Vec<SourceRef> = Vec::new();
        for p in &self.passages {
            let seen = sources
                .iter()
                .any(|s| s.author == p.author && s.source == p.source);
            if !seen {
                sources.push(SourceRef {
                    author: p.author.clone(),
                    source: p.source.clone(),
                    source_year: p.source_year.clone(),
                });
            }
        }
        sources
    }
}

/// Where the registry lives between runs.
pub trait RegistryStore: Send + Sync {
    /// Reads the registry. Absence means "no history yet", not an error.
    fn load(&self) -> Result<Registry, PipelineError>;

    /// Replaces the stored registry as a whole.
    fn persist(&self, registry: &Registry) -> Result<(), PipelineError>;
}

/// The registry as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonRegistryFile {
    path: PathBuf,
}

impl JsonRegistryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for JsonRegistryFile {
    fn load(&self) -> Result<Registry, PipelineError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No passage registry at {}; starting empty",
                    self.path.display()
                );
                return Ok(Registry::default());
            }
            Err(e) => return Err(PipelineError::fs(&self.path, e)),
        };

        let registry: Registry =
            serde_json::from_str(&raw).map_err(|source| PipelineError::Registry {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            "Loaded {} passages from {}",
            registry.passages.len(),
            self.path.display()
        );
        Ok(registry)
    }

    fn persist(&self, registry: &Registry) -> Result<(), PipelineError> {
        let mut json =
            serde_json::to_string_pretty(registry).map_err(|source| PipelineError::Registry {
                path: self.path.clone(),
                source,
            })?;
        json.push('\n');
        write_atomic(&self.path, &json)?;
        debug!(
            "Persisted {} passages to {}",
            registry.passages.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use super::*;

    /// In-memory store for orchestration tests.
    #[derive(Default)]
    pub struct MemoryRegistryStore {
        pub stored: Mutex<Option<Registry>>,
        pub fail_persist: bool,
    }

    impl MemoryRegistryStore {
        pub fn with(registry: Registry) -> Self {
            Self {
                stored: Mutex::new(Some(registry)),
                fail_persist: false,
            }
        }

        pub fn snapshot(&self) -> Option<Registry> {
            self.stored.lock().unwrap().clone()
        }
    }

    impl RegistryStore for MemoryRegistryStore {
        fn load(&self) -> Result<Registry, PipelineError> {
            Ok(self.snapshot().unwrap_or_default())
        }

        fn persist(&self, registry: &Registry) -> Result<(), PipelineError> {
            if self.fail_persist {
                return Err(PipelineError::fs(
                    "memory",
                    std::io::Error::new(ErrorKind::Other, "persist disabled"),
                ));
            }
            *self.stored.lock().unwrap() = Some(registry.clone());
            Ok(())
        }
    }
}
