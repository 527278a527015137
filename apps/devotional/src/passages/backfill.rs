//! Rebuilds the passage registry from the entry files already on disk.
//!
//! Historical duplicates are reported and kept: the registry ends up with one
//! record per readable entry.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::entries::frontmatter::split_document;
use crate::entries::store::EntryStore;
use crate::errors::PipelineError;
use crate::models::entry::EntryFields;
use crate::models::passage::{PassageRecord, Registry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateHash {
    pub entry_date: NaiveDate,
    pub first_entry_date: NaiveDate,
    pub passage_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub entry_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub registry: Registry,
    pub duplicates: Vec<DuplicateHash>,
    pub skipped: Vec<SkippedEntry>,
}

/// Scans every entry, oldest first, and returns the rebuilt registry. The
/// caller decides whether to persist it.
pub fn backfill(store: &EntryStore) -> Result<BackfillReport, PipelineError> {
    let dates = store.list_dates()?;
    info!("Found {} entries to process", dates.len());

    let mut report = BackfillReport::default();
    for date in dates {
        let record = match store
            .read(date)
            .map_err(|e| e.to_string())
            .and_then(|content| record_from_entry(&content, date))
        {
            Ok(record) => record,
            Err(reason) => {
                warn!("{date}: {reason}; skipped");
                report.skipped.push(SkippedEntry {
                    entry_date: date,
                    reason,
                });
                continue;
            }
        };

        if let Some(first) = report.registry.find_by_hash(&record.passage_hash) {
            warn!(
                "{date}: DUPLICATE HASH detected ({}), first used on {}",
                &record.passage_hash[..8],
                first.entry_date
            );
            report.duplicates.push(DuplicateHash {
                entry_date: date,
                first_entry_date: first.entry_date,
                passage_hash: record.passage_hash.clone(),
            });
        }

        info!("{date}: {} \"{}\"", record.author, record.source);
        report.registry = report.registry.append(record);
    }

    info!(
        "Rebuilt registry with {} passages ({} duplicate hashes, {} skipped)",
        report.registry.passages.len(),
        report.duplicates.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn record_from_entry(content: &str, date: NaiveDate) -> Result<PassageRecord, String> {
    let (frontmatter, _) = split_document(content).ok_or("no frontmatter block")?;
    let passage = frontmatter.text("passage").ok_or("could not extract passage")?;
    let fields: EntryFields = frontmatter
        .fields()
        .map_err(|e| format!("invalid frontmatter: {e}"))?;
    let author = fields.author.ok_or("missing author")?;
    let source = fields.source.ok_or("missing source")?;
    let source_year = fields.source_year;

    Ok(PassageRecord::from_passage(
        &author,
        &source,
        source_year.as_deref(),
        &passage,
        date,
    ))
}
