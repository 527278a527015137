//! Publisher: flips `draft: true` to `draft: false` once an entry's date
//! has arrived. Only the draft line changes; the rest of the file is kept
//! byte for byte.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::entries::frontmatter::is_delimiter;
use crate::entries::store::EntryStore;
use crate::errors::PipelineError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub published: Vec<NaiveDate>,
}

/// Publishes every draft dated on or before `today`.
pub fn publish_due(store: &EntryStore, today: NaiveDate) -> Result<PublishReport, PipelineError> {
    let mut report = PublishReport::default();

    for date in store.list_dates()?.into_iter().filter(|d| *d <= today) {
        let content = match store.read(date) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping {date}: {e}");
                continue;
            }
        };
        let Some(updated) = flip_draft(&content) else {
            continue;
        };
        store.rewrite(date, &updated)?;
        info!("Published: {}", store.path_for(date).display());
        report.published.push(date);
    }

    if report.published.is_empty() {
        info!("No entries to publish today.");
    } else {
        info!("Published {} entry/entries.", report.published.len());
    }
    Ok(report)
}

/// Returns the file with its first `draft: true` frontmatter line flipped, or
/// `None` when the entry is not a draft.
fn flip_draft(content: &str) -> Option<String> {
    let mut out = String::with_capacity(content.len());
    let mut delimiters_seen = 0;
    let mut flipped = false;

    for (index, line) in content.split_inclusive('\n').enumerate() {
        let text = line.trim_end_matches(['\n', '\r']);
        if is_delimiter(text) {
            delimiters_seen += 1;
        } else if index == 0 {
            // Not an entry file; nothing to publish.
            return None;
        }

        if !flipped && delimiters_seen == 1 && is_draft_true(text) {
            out.push_str("draft: false");
            out.push_str(&line[text.len()..]);
            flipped = true;
        } else {
            out.push_str(line);
        }
    }

    flipped.then_some(out)
}

fn is_draft_true(line: &str) -> bool {
    line.strip_prefix("draft:")
        .map(|value| value.trim() == "true")
        .unwrap_or(false)
}
