use chrono::NaiveDate;
use serde::Deserialize;

use crate::entries::frontmatter::Frontmatter;

/// Typed view of the frontmatter keys the pipeline reads, deserialized from
/// the block as YAML. Absent and null keys read as `None`; unknown keys are
/// ignored. `passage` is deliberately not here: it is read from the lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFields {
    pub title: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub source: Option<String>,
    pub source_year: Option<String>,
    pub excerpt: Option<bool>,
    pub passage_link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub draft: Option<bool>,
}

/// A generated entry that passed validation.
///
/// `frontmatter` and `body` are what the model emitted after cleaning; the
/// typed fields are read from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub title: String,
    pub date: NaiveDate,
    pub passage: String,
    pub author: String,
    pub source: String,
    pub source_year: Option<String>,
    pub excerpt: bool,
    pub passage_link: Option<String>,
    pub tags: Vec<String>,
    pub body: String,
    pub frontmatter: Frontmatter,
}

impl ParsedEntry {
    /// The entry file to write. Generated entries always start as drafts,
    /// whatever the model put in its `draft` line.
    pub fn to_draft_document(&self) -> String {
        let mut frontmatter = self.frontmatter.clone();
        frontmatter.set_scalar("draft", "true");
        frontmatter.render(&self.body)
    }
}
