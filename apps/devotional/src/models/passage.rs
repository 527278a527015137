use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const REGISTRY_VERSION: u32 = 1;

/// One previously used passage. Created once, never mutated.
///
/// `passage_hash` is the deduplication key; `id` is a readable slug and may
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassageRecord {
    pub id: String,
    pub author: String,
    pub source: String,
    pub source_year: Option<String>,
    pub passage_hash: String,
    pub passage_preview: String,
    pub entry_date: NaiveDate,
}

/// The persisted passage registry, `used-passages.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub version: u32,
    pub last_updated: Option<DateTime<Utc>>,
    pub passages: Vec<PassageRecord>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            version: REGISTRY_VERSION,
            last_updated: None,
            passages: Vec::new(),
        }
    }
}

/// A source work already featured, as shown to the prompt builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub author: String,
    pub source: String,
    pub source_year: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_shape() {
        let json = serde_json::to_value(Registry::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "version": 1, "lastUpdated": null, "passages": [] })
        );
    }

    #[test]
    fn test_registry_reads_existing_file_format() {
        let json = r#"{
            "version": 1,
            "lastUpdated": "2025-02-03T04:05:06.789Z",
            "passages": [
                {
                    "id": "seneca-on-the-shortness-of-life-49-abcdef12",
                    "author": "Seneca",
                    "source": "On the Shortness of Life",
                    "sourceYear": "49",
                    "passageHash": "abcdef1234",
                    "passagePreview": "It is not that we have a short time to live...",
                    "entryDate": "2025-02-01"
                },
                {
                    "id": "x-y-00000000",
                    "author": "X",
                    "source": "Y",
                    "sourceYear": null,
                    "passageHash": "00000000",
                    "passagePreview": "...",
                    "entryDate": "2025-02-02"
                }
            ]
        }"#;

        let registry: Registry = serde_json::from_str(json).unwrap();
        assert_eq!(registry.passages.len(), 2);
        assert!(registry.last_updated.is_some());
        assert_eq!(registry.passages[0].source_year.as_deref(), Some("49"));
        assert_eq!(registry.passages[1].source_year, None);
        assert_eq!(
            registry.passages[1].entry_date,
            NaiveDate::from_ymd_opt(2025, 2, 2).unwrap()
        );
    }
}
