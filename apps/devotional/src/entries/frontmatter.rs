//! Line-oriented access to an entry's frontmatter block.
//!
//! Lines locate the block, its keys and the passage text; typed values come
//! from deserializing the block as YAML. The passage is always read from the
//! lines, so the live generation path and the registry backfill hash exactly
//! the same text.

use serde::de::DeserializeOwned;

pub const DELIMITER: &str = "---";

/// Indentation stripped from each block-scalar line.
const BLOCK_INDENT: &str = "  ";

/// True for a `---` line starting in column 0. Trailing whitespace is
/// ignored; an indented `---` belongs to a block scalar.
pub fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Returns the key of a top-level `key: value` line.
///
/// A top-level key starts in column 0 with an ASCII letter and is made of
/// letters, digits, `_` or `-` up to the colon.
pub fn top_level_key(line: &str) -> Option<&str> {
    let (key, _) = line.split_once(':')?;
    let mut chars = key.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        Some(key)
    } else {
        None
    }
}

/// The raw lines of a frontmatter block, without the delimiters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    lines: Vec<String>,
}

impl Frontmatter {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.key_index(key).is_some()
    }

    fn key_index(&self, key: &str) -> Option<usize> {
        self.lines.iter().position(|l| top_level_key(l) == Some(key))
    }

    fn inline_value(&self, index: usize) -> &str {
        self.lines[index]
            .split_once(':')
            .map(|(_, v)| v.trim())
            .unwrap_or("")
    }

    /// Lines belonging to the value of the key at `index`, up to the next
    /// top-level key.
    fn continuation(&self, index: usize) -> impl Iterator<Item = &str> {
        self.lines[index + 1..]
            .iter()
            .map(String::as_str)
            .take_while(|l| top_level_key(l).is_none() && !is_delimiter(l))
    }

    /// Multi-line text value. Handles `|`, `|-`, `>` and `>-` block scalars
    /// as well as inline values. The result is trimmed.
    pub fn text(&self, key: &str) -> Option<String> {
        let index = self.key_index(key)?;
        let inline = self.inline_value(index);

        let indicator = inline.chars().next();
        let is_block = inline.is_empty() || matches!(indicator, Some('|') | Some('>'));
        if !is_block {
            // Plain or quoted scalar on the key line.
            let value: String = serde_yaml::from_str(inline).ok()?;
            let value = value.trim();
            return (!value.is_empty()).then(|| value.to_string());
        }

        let lines: Vec<&str> = self
            .continuation(index)
            .map(|l| l.strip_prefix(BLOCK_INDENT).unwrap_or(l))
            .collect();

        let text = if indicator == Some('>') {
            fold(&lines)
        } else {
            lines.join("\n")
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Deserializes the whole block as YAML.
    pub fn fields<T: DeserializeOwned>(&self) -> Result<T, serde_yaml::Error> {
        serde_yaml::from_str(&self.lines.join("\n"))
    }

    /// Sets a single-line value, replacing the existing line or appending a
    /// new one at the end of the block.
    pub fn set_scalar(&mut self, key: &str, value: &str) {
        let line = format!("{key}: {value}");
        match self.key_index(key) {
            Some(index) => self.lines[index] = line,
            None => self.lines.push(line),
        }
    }

    /// Renders the block and body as an entry file.
    pub fn render(&self, body: &str) -> String {
        let mut out = String::new();
        out.push_str(DELIMITER);
        out.push('\n');
        for line in self.lines() {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push_str("\n\n");
        out.push_str(body.trim());
        out.push('\n');
        out
    }
}

/// Splits an entry file into its frontmatter and body. The file must open
/// with a delimiter line; returns `None` otherwise or if the block is never
/// closed.
pub fn split_document(text: &str) -> Option<(Frontmatter, String)> {
    let mut lines = text.lines();
    if !is_delimiter(lines.next()?) {
        return None;
    }

    let mut block = Vec::new();
    for line in lines.by_ref() {
        if is_delimiter(line) {
            let body = lines.collect::<Vec<_>>().join("\n");
            return Some((Frontmatter::from_lines(block), body.trim().to_string()));
        }
        block.push(line);
    }
    None
}

fn fold(lines: &[&str]) -> String {
    let mut out = String::new();
    for line in lines {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push(' ');
            }
            out.push_str(line.trim());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"---
title: "The Slow Hand"
date: 2024-02-01
passage: |
  I wandered lonely as a cloud
  That floats on high o'er vales and hills,

  When all at once I saw a crowd,
author: "William Wordsworth"
source: 'I Wandered Lonely as a Cloud'
sourceYear: c. 1804
excerpt: false
tags:
  - attention
  - solitude
draft: true
---

Commentary body here.
"#;

    fn sample() -> Frontmatter {
        split_document(SAMPLE).unwrap().0
    }

    #[test]
    fn test_top_level_key_detection() {
        assert_eq!(top_level_key("title: x"), Some("title"));
        assert_eq!(top_level_key("sourceYear: 1850"), Some("sourceYear"));
        assert_eq!(top_level_key("  - tag"), None);
        assert_eq!(top_level_key("  indented: nope"), None);
        assert_eq!(top_level_key("no colon here"), None);
        assert_eq!(top_level_key("Two words: still prose"), None);
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Attribution {
        title: String,
        author: String,
        source: String,
        source_year: Option<String>,
        passage_link: Option<String>,
        tags: Vec<String>,
        draft: Option<bool>,
    }

    #[test]
    fn test_fields_deserializes_block() {
        let fields: Attribution = sample().fields().unwrap();
        assert_eq!(fields.title, "The Slow Hand");
        assert_eq!(fields.author, "William Wordsworth");
        assert_eq!(fields.source, "I Wandered Lonely as a Cloud");
        assert_eq!(fields.source_year.as_deref(), Some("c. 1804"));
        assert_eq!(fields.passage_link, None);
        assert_eq!(fields.tags, vec!["attention", "solitude"]);
        assert_eq!(fields.draft, Some(true));
    }

    #[test]
    fn test_fields_rejects_invalid_yaml() {
        let fm = Frontmatter::from_lines(["title: Waiting: A Meditation"]);
        assert!(fm.fields::<serde_yaml::Value>().is_err());
    }

    #[test]
    fn test_block_scalar_strips_indent_and_keeps_line_breaks() {
        let passage = sample().text("passage").unwrap();
        assert_eq!(
            passage,
            "I wandered lonely as a cloud\nThat floats on high o'er vales and hills,\n\nWhen all at once I saw a crowd,"
        );
    }

    #[test]
    fn test_inline_text_value() {
        let fm = Frontmatter::from_lines(["passage: \"Know thyself.\""]);
        assert_eq!(fm.text("passage").as_deref(), Some("Know thyself."));
    }

    #[test]
    fn test_folded_block_scalar_joins_lines() {
        let fm = Frontmatter::from_lines(["passage: >", "  one", "  two", "", "  three"]);
        assert_eq!(fm.text("passage").as_deref(), Some("one two\nthree"));
    }

    #[test]
    fn test_block_scalar_stops_at_closing_delimiter() {
        let fm = Frontmatter::from_lines(["passage: |", "  line", "---", "  after"]);
        assert_eq!(fm.text("passage").as_deref(), Some("line"));
    }

    #[test]
    fn test_indented_delimiter_stays_in_block_scalar() {
        assert!(is_delimiter("---"));
        assert!(is_delimiter("---  "));
        assert!(!is_delimiter("  ---"));

        let (fm, _) = split_document("---\npassage: |\n  part one\n  ---\n  part two\nauthor: x\n---\nbody\n").unwrap();
        assert_eq!(fm.text("passage").as_deref(), Some("part one\n---\npart two"));
        assert!(fm.has_key("author"));
    }

    #[test]
    fn test_set_scalar_replaces_or_appends() {
        let mut fm = Frontmatter::from_lines(["title: a", "draft: false"]);
        fm.set_scalar("draft", "true");
        assert_eq!(fm.lines(), ["title: a", "draft: true"]);

        let mut fm = Frontmatter::from_lines(["title: a"]);
        fm.set_scalar("draft", "true");
        assert_eq!(fm.lines(), ["title: a", "draft: true"]);
    }

    #[test]
    fn test_split_document_requires_leading_delimiter() {
        assert!(split_document("title: x\n---\n").is_none());
        assert!(split_document("---\ntitle: x\n").is_none());

        let (fm, body) = split_document(SAMPLE).unwrap();
        assert!(fm.has_key("tags"));
        assert_eq!(body, "Commentary body here.");
    }

    #[test]
    fn test_render_then_split_preserves_block() {
        let (fm, body) = split_document(SAMPLE).unwrap();
        let rendered = fm.render(&body);
        let (again, body_again) = split_document(&rendered).unwrap();
        assert_eq!(again, fm);
        assert_eq!(body_again, body);
    }
}
