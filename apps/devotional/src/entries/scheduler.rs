//! Entry Scheduler: picks the next entry's date and summarizes recent entries
//! so the prompt can steer away from repeats.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use tracing::warn;

use crate::entries::frontmatter::split_document;
use crate::entries::store::EntryStore;
use crate::models::entry::EntryFields;

/// How many of the latest entries feed the avoidance lists.
pub const RECENT_HISTORY_WINDOW: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// No entry exists for this date yet.
    Target(NaiveDate),
    /// An entry already exists for the date that would be chosen. Benign: the
    /// caller stops without writing.
    AlreadyExists(NaiveDate),
}

/// Current calendar date at the UTC day boundary.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// The day after the latest existing entry, or `today` when there are none.
pub fn next_date(existing: &BTreeSet<NaiveDate>, today: NaiveDate) -> NaiveDate {
    match existing.last() {
        // succ_opt only fails at NaiveDate::MAX, which then reads as taken.
        Some(latest) => latest.succ_opt().unwrap_or(*latest),
        None => today,
    }
}

/// Chooses the target date and checks it against what is on disk right now.
pub fn schedule(
    existing: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    exists: impl Fn(NaiveDate) -> bool,
) -> Scheduled {
    let target = next_date(existing, today);
    if existing.contains(&target) || exists(target) {
        Scheduled::AlreadyExists(target)
    } else {
        Scheduled::Target(target)
    }
}

/// Authors and tags used by recent entries, deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentHistory {
    pub authors: Vec<String>,
    pub tags: Vec<String>,
}

/// Reads the last `window` entries. Unreadable files and missing fields are
/// skipped; they only weaken the avoidance hints.
pub fn recent_history(
    store: &EntryStore,
    existing: &BTreeSet<NaiveDate>,
    window: usize,
) -> RecentHistory {
    let skip = existing.len().saturating_sub(window);
    let mut history = RecentHistory::default();

    for date in existing.iter().skip(skip) {
        let content = match store.read(*date) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping {date} in recent history: {e}");
                continue;
            }
        };
        let Some((frontmatter, _)) = split_document(&content) else {
            warn!("Skipping {date} in recent history: no frontmatter");
            continue;
        };

        let fields: EntryFields = match frontmatter.fields() {
            Ok(fields) => fields,
            Err(e) => {
                warn!("Skipping {date} in recent history: {e}");
                continue;
            }
        };

        if let Some(author) = fields.author {
            push_unique(&mut history.authors, author);
        }
        for tag in fields.tags.unwrap_or_default() {
            push_unique(&mut history.tags, tag);
        }
    }

    history
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dates(range: &[&str]) -> BTreeSet<NaiveDate> {
        range.iter().map(|s| date(s)).collect()
    }

    #[test]
    fn test_next_date_after_latest() {
        let existing = dates(&[
            "2024-01-01",
            "2024-01-02",
            "2024-01-03",
            "2024-01-04",
            "2024-01-05",
        ]);
        assert_eq!(next_date(&existing, date("2030-06-01")), date("2024-01-06"));
    }

    #[test]
    fn test_next_date_with_no_entries_is_today() {
        let today = date("2024-07-14");
        assert_eq!(next_date(&BTreeSet::new(), today), today);
    }

    #[test]
    fn test_next_date_crosses_month_and_leap_day() {
        assert_eq!(
            next_date(&dates(&["2024-02-28"]), date("2000-01-01")),
            date("2024-02-29")
        );
        assert_eq!(
            next_date(&dates(&["2023-12-31"]), date("2000-01-01")),
            date("2024-01-01")
        );
    }

    #[test]
    fn test_next_date_ignores_gaps() {
        let existing = dates(&["2024-01-01", "2024-01-10"]);
        assert_eq!(next_date(&existing, date("2024-01-02")), date("2024-01-11"));
    }

    #[test]
    fn test_schedule_collision_is_a_no_op() {
        let existing = dates(&["2024-01-04", "2024-01-05"]);
        let scheduled = schedule(&existing, date("2024-01-01"), |d| d == date("2024-01-06"));
        assert_eq!(scheduled, Scheduled::AlreadyExists(date("2024-01-06")));
    }

    #[test]
    fn test_schedule_free_date() {
        let existing = dates(&["2024-01-05"]);
        let scheduled = schedule(&existing, date("2024-01-01"), |_| false);
        assert_eq!(scheduled, Scheduled::Target(date("2024-01-06")));
    }

    #[test]
    fn test_recent_history_reads_last_window() {
        let dir = tempfile::tempdir().unwrap();
        let store = EntryStore::new(dir.path());
        let entries = [
            ("2024-01-01", "Seneca", "time"),
            ("2024-01-02", "Mary Oliver", "attention"),
            ("2024-01-03", "Rilke", "solitude"),
            ("2024-01-04", "Mary Oliver", "attention"),
        ];
        for (d, author, tag) in entries {
            let body = format!(
                "---\ntitle: t\nauthor: \"{author}\"\ntags:\n  - {tag}\n  - craft\n---\n\nbody\n"
            );
            store.create(date(d), &body).unwrap();
        }
        std::fs::write(dir.path().join("2024-01-05.md"), "no frontmatter").unwrap();

        let existing = store.list_dates().unwrap();
        let history = recent_history(&store, &existing, 4);

        assert_eq!(history.authors, vec!["Mary Oliver", "Rilke"]);
        assert_eq!(history.tags, vec!["attention", "craft", "solitude"]);
    }

    #[test]
    fn test_recent_history_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = EntryStore::new(dir.path());
        let history = recent_history(&store, &BTreeSet::new(), RECENT_HISTORY_WINDOW);
        assert_eq!(history, RecentHistory::default());
    }
}
