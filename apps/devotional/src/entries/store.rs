use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::debug;

use crate::errors::PipelineError;
use crate::storage::{write_atomic, write_new};

const ENTRY_EXTENSION: &str = ".md";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses `YYYY-MM-DD.md` into its date. Any other name is not an entry.
pub fn parse_entry_file_name(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(ENTRY_EXTENSION)?;
    let well_shaped = stem.len() == 10
        && stem.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_shaped {
        return None;
    }
    NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
}

/// The entries directory. One file per calendar date, keyed by file name.
#[derive(Debug, Clone)]
pub struct EntryStore {
    dir: PathBuf,
}

impl EntryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn ensure_dir(&self) -> Result<(), PipelineError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| PipelineError::fs(&self.dir, e))
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}{}", date.format(DATE_FORMAT), ENTRY_EXTENSION))
    }

    pub fn exists(&self, date: NaiveDate) -> bool {
        self.path_for(date).exists()
    }

    /// Dates of every entry file, oldest first. A missing directory has no
    /// entries.
    pub fn list_dates(&self) -> Result<BTreeSet<NaiveDate>, PipelineError> {
        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(PipelineError::fs(&self.dir, e)),
        };

        let mut dates = BTreeSet::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| PipelineError::fs(&self.dir, e))?;
            let Some(date) = dir_entry.file_name().to_str().and_then(parse_entry_file_name) else {
                continue;
            };
            let is_file = dir_entry
                .file_type()
                .map(|t| t.is_file())
                .map_err(|e| PipelineError::fs(dir_entry.path(), e))?;
            if is_file {
                dates.insert(date);
            }
        }

        debug!("Found {} entries in {}", dates.len(), self.dir.display());
        Ok(dates)
    }

    pub fn read(&self, date: NaiveDate) -> Result<String, PipelineError> {
        let path = self.path_for(date);
        std::fs::read_to_string(&path).map_err(|e| PipelineError::fs(path, e))
    }

    /// Writes a new entry. Never overwrites an existing date.
    pub fn create(&self, date: NaiveDate, contents: &str) -> Result<PathBuf, PipelineError> {
        let path = self.path_for(date);
        write_new(&path, contents)?;
        Ok(path)
    }

    /// Replaces an existing entry's contents.
    pub fn rewrite(&self, date: NaiveDate, contents: &str) -> Result<(), PipelineError> {
        write_atomic(&self.path_for(date), contents)
    }

    pub fn remove(&self, date: NaiveDate) -> Result<(), PipelineError> {
        let path = self.path_for(date);
        std::fs::remove_file(&path).map_err(|e| PipelineError::fs(path, e))
    }
}
