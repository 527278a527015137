//! Subcommand handlers. Each one wires the filesystem stores and, for
//! `generate`, the model client into the pipeline functions.

use std::num::NonZeroU32;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, EditorialConfig, Paths};
use crate::entries::publisher::publish_due;
use crate::entries::scheduler::today_utc;
use crate::entries::store::EntryStore;
use crate::generation::generator::{generate_entries, GenerationContext};
use crate::llm_client::LlmClient;
use crate::passages::backfill::backfill;
use crate::passages::registry::{JsonRegistryFile, RegistryStore};

pub async fn generate(paths: &Paths, count: NonZeroU32) -> Result<()> {
    let config = Config::from_env()?;
    let editorial = EditorialConfig::load(&paths.sources_file)?;
    let client = LlmClient::new(config.llm).context("failed to build the HTTP client")?;
    info!("Using {} for {}", client.model(), editorial.site_name);

    let store = EntryStore::new(paths.entries_dir.clone());
    let registry = JsonRegistryFile::new(paths.registry_file.clone());
    let ctx = GenerationContext {
        store: &store,
        registry_store: &registry,
        editorial: &editorial,
        generator: &client,
    };

    let summary = generate_entries(&ctx, count.get(), today_utc()).await?;
    match summary.stopped_on {
        Some(date) => info!(
            "Stopped at {date}; wrote {} new draft(s)",
            summary.written.len()
        ),
        None => info!("Done. Wrote {} new draft(s)", summary.written.len()),
    }
    Ok(())
}

pub fn publish(paths: &Paths) -> Result<()> {
    let store = EntryStore::new(paths.entries_dir.clone());
    publish_due(&store, today_utc())?;
    Ok(())
}

pub fn backfill_registry(paths: &Paths) -> Result<()> {
    let store = EntryStore::new(paths.entries_dir.clone());
    let report = backfill(&store)?;

    let registry = JsonRegistryFile::new(paths.registry_file.clone());
    registry.persist(&report.registry)?;
    info!(
        "Wrote {} passages to {}",
        report.registry.passages.len(),
        registry.path().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::passages::normalize::{hash_passage, normalize};

    fn paths(root: &Path) -> Paths {
        Paths {
            entries_dir: root.join("entries"),
            registry_file: root.join("used-passages.json"),
            sources_file: root.join("sources.json"),
        }
    }

    #[test]
    fn test_backfill_registry_writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        std::fs::create_dir_all(&paths.entries_dir).unwrap();
        std::fs::write(
            paths.entries_dir.join("2024-01-01.md"),
            "---\ntitle: \"T\"\ndate: 2024-01-01\npassage: |\n  Know thyself.\nauthor: \"Socrates\"\nsource: \"Apology\"\ntags: [self]\ndraft: false\n---\n\nBody.\n",
        )
        .unwrap();

        backfill_registry(&paths).unwrap();

        let registry = JsonRegistryFile::new(paths.registry_file.clone())
            .load()
            .unwrap();
        assert_eq!(registry.passages.len(), 1);
        assert_eq!(
            registry.passages[0].passage_hash,
            hash_passage(&normalize("Know thyself."))
        );
    }

    #[test]
    fn test_publish_with_missing_entries_dir_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        publish(&paths(dir.path())).unwrap();
    }
}
