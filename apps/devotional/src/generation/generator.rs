//! Entry Generation: orchestrates one run of the pipeline.
//!
//! Flow per entry: schedule → recent history → prompt → external call →
//! validate → duplicate check → write draft → append + persist registry.
//!
//! All-or-nothing per entry: no file is written unless the response passed
//! validation and the passage is new, and a registry that cannot be persisted
//! takes its entry file with it.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::config::EditorialConfig;
use crate::entries::scheduler::{recent_history, schedule, Scheduled, RECENT_HISTORY_WINDOW};
use crate::entries::store::EntryStore;
use crate::errors::{MalformedResponse, PipelineError};
use crate::generation::prompt_builder::build_prompt;
use crate::generation::validator::{clean_response, validate};
use crate::llm_client::Generator;
use crate::models::passage::{PassageRecord, Registry};
use crate::passages::registry::RegistryStore;

/// How much of a rejected response is kept for diagnosis.
const DIAGNOSTIC_PREFIX_CHARS: usize = 500;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Everything a run reads from or writes to.
pub struct GenerationContext<'a> {
    pub store: &'a EntryStore,
    pub registry_store: &'a dyn RegistryStore,
    pub editorial: &'a EditorialConfig,
    pub generator: &'a dyn Generator,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Dates written, in order.
    pub written: Vec<NaiveDate>,
    /// Set when the run stopped early because the next date was already taken.
    pub stopped_on: Option<NaiveDate>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Generates up to `count` entries on consecutive dates.
///
/// Steps:
/// 1. ensure the entries directory exists
/// 2. load the registry once; it is threaded through each iteration
/// 3. per entry: re-list the directory and schedule the next date
/// 4. stop without error if that date is already taken
/// 5. otherwise run `generate_one`; the first failure aborts the run
///
/// Entries written before a failure stay written.
pub async fn generate_entries(
    ctx: &GenerationContext<'_>,
    count: u32,
    today: NaiveDate,
) -> Result<RunSummary, PipelineError> {
    ctx.store.ensure_dir()?;
    let mut registry = ctx.registry_store.load()?;
    info!(
        "Generating {count} entr{} ({} passages already used)",
        if count == 1 { "y" } else { "ies" },
        registry.passages.len()
    );

    let mut summary = RunSummary::default();
    for i in 0..count {
        let existing = ctx.store.list_dates()?;
        let target = match schedule(&existing, today, |d| ctx.store.exists(d)) {
            Scheduled::Target(date) => date,
            Scheduled::AlreadyExists(date) => {
                info!("Entry for {date} already exists. Skipping.");
                summary.stopped_on = Some(date);
                break;
            }
        };

        info!("[{}/{count}] Generating entry for {target}", i + 1);
        registry = generate_one(ctx, registry, &existing, target).await?;
        summary.written.push(target);
    }

    Ok(summary)
}

/// Generates, validates and writes the entry for `target`. Returns the
/// registry with the new passage appended and persisted.
async fn generate_one(
    ctx: &GenerationContext<'_>,
    registry: Registry,
    existing: &BTreeSet<NaiveDate>,
    target: NaiveDate,
) -> Result<Registry, PipelineError> {
    // 1. Prompt
    let history = recent_history(ctx.store, existing, RECENT_HISTORY_WINDOW);
    let prompt = build_prompt(ctx.editorial, &history, &registry.unique_sources(), target);

    // 2. External call
    let raw = ctx.generator.generate(&prompt).await?;

    // 3. Validate
    let entry = validate(&raw).map_err(|reason| malformed(reason, &raw))?;
    if entry.date != target {
        return Err(malformed(
            MalformedResponse::DateMismatch {
                expected: target,
                found: entry.date,
            },
            &raw,
        ));
    }
    info!(
        "Validated: \"{}\" by {} ({})",
        entry.title, entry.author, entry.source
    );
    debug!(
        "tags={:?} excerpt={} passageLink={:?}",
        entry.tags, entry.excerpt, entry.passage_link
    );

    // 4. Duplicate check
    let record = PassageRecord::from_passage(
        &entry.author,
        &entry.source,
        entry.source_year.as_deref(),
        &entry.passage,
        target,
    );
    if let Some(original) = registry.find_by_hash(&record.passage_hash) {
        warn!(
            "Passage from {} \"{}\" was already used on {}",
            original.author, original.source, original.entry_date
        );
        return Err(PipelineError::DuplicatePassage {
            original_entry_date: original.entry_date,
            passage_hash: record.passage_hash,
        });
    }

    // 5. Write the draft
    let path = ctx.store.create(target, &entry.to_draft_document())?;
    info!("Wrote {}", path.display());

    // 6. Record the passage
    let passage_hash = record.passage_hash.clone();
    let registry = registry.append(record);
    if let Err(e) = ctx.registry_store.persist(&registry) {
        error!(
            "Registry could not be saved; removing {} so entries and registry stay in step",
            path.display()
        );
        if let Err(cleanup) = ctx.store.remove(target) {
            warn!("Failed to remove {}: {cleanup}", path.display());
        }
        return Err(e);
    }
    info!("Registered passage {passage_hash}");

    Ok(registry)
}

/// Logs a rejected response and builds its error with diagnostic prefixes.
fn malformed(reason: MalformedResponse, raw: &str) -> PipelineError {
    let raw_prefix = prefix(raw);
    let cleaned_prefix = prefix(&clean_response(raw));
    error!(code = reason.code(), "Response rejected: {reason}");
    error!("Raw output (first {DIAGNOSTIC_PREFIX_CHARS} chars):\n{raw_prefix}");
    error!("Cleaned output (first {DIAGNOSTIC_PREFIX_CHARS} chars):\n{cleaned_prefix}");
    PipelineError::MalformedResponse {
        reason,
        raw_prefix,
        cleaned_prefix,
    }
}

fn prefix(text: &str) -> String {
    text.chars().take(DIAGNOSTIC_PREFIX_CHARS).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
