//! Response Validator: the only gate between model output and a persisted
//! entry. Fails closed: anything that does not match the output contract is
//! rejected, never repaired.
//!
//! Flow: strip reasoning → strip code fence → locate frontmatter (state
//! machine) → required keys → commentary length → YAML → typed fields.

use chrono::NaiveDate;
use tracing::info;
use url::Url;

use crate::entries::frontmatter::{is_delimiter, Frontmatter};
use crate::errors::MalformedResponse;
use crate::models::entry::{EntryFields, ParsedEntry};

/// Checked in this order; the first one missing is reported.
pub const REQUIRED_FIELDS: [&str; 6] = ["title:", "date:", "passage:", "author:", "source:", "tags:"];

pub const MIN_COMMENTARY_CHARS: usize = 100;

pub const MAX_TAGS: usize = 5;

const REASONING_CLOSERS: [&str; 2] = ["</think>", "</thinking>"];
const CODE_FENCE: &str = "```";

/// Strips model wrapping: everything up to the last reasoning close tag, then
/// a surrounding code fence.
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();

    let reasoning_end = REASONING_CLOSERS
        .iter()
        .filter_map(|tag| text.rfind(tag).map(|at| at + tag.len()))
        .max();
    if let Some(end) = reasoning_end {
        info!("Stripped reasoning block ({end} chars)");
        text = text[end..].trim();
    }

    strip_code_fence(text).to_string()
}

fn strip_code_fence(text: &str) -> &str {
    let mut text = text;
    if text.starts_with(CODE_FENCE) {
        // Drop the opening fence line, including any language tag.
        text = text.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    }
    if let Some(stripped) = text.trim_end().strip_suffix(CODE_FENCE) {
        text = stripped;
    }
    text.trim()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekingStart,
    InBlock,
    InBody,
}

/// Splits cleaned output into frontmatter and body. Prose before the opening
/// delimiter is discarded.
fn locate_frontmatter(cleaned: &str) -> Result<(Frontmatter, String), MalformedResponse> {
    let mut state = ScanState::SeekingStart;
    let mut block = Vec::new();
    let mut body = Vec::new();
    let mut preamble_chars = 0;

    for line in cleaned.lines() {
        match state {
            ScanState::SeekingStart if is_delimiter(line) => state = ScanState::InBlock,
            ScanState::SeekingStart => preamble_chars += line.len() + 1,
            ScanState::InBlock if is_delimiter(line) => state = ScanState::InBody,
            ScanState::InBlock => block.push(line),
            ScanState::InBody => body.push(line),
        }
    }

    match state {
        ScanState::SeekingStart => Err(MalformedResponse::NoFrontmatterStart),
        ScanState::InBlock => Err(MalformedResponse::NoFrontmatterEnd),
        ScanState::InBody => {
            if preamble_chars > 0 {
                info!("Stripped {preamble_chars} additional chars before frontmatter");
            }
            Ok((
                Frontmatter::from_lines(block),
                body.join("\n").trim().to_string(),
            ))
        }
    }
}

/// Validates raw model output and extracts the entry.
pub fn validate(raw: &str) -> Result<ParsedEntry, MalformedResponse> {
    let cleaned = clean_response(raw);
    info!("Cleaned output length: {} chars", cleaned.len());

    let (frontmatter, body) = locate_frontmatter(&cleaned)?;

    for field in REQUIRED_FIELDS {
        if !frontmatter.has_key(field.trim_end_matches(':')) {
            return Err(MalformedResponse::MissingField(field));
        }
    }

    let length = body.chars().count();
    if length < MIN_COMMENTARY_CHARS {
        return Err(MalformedResponse::CommentaryTooShort {
            length,
            minimum: MIN_COMMENTARY_CHARS,
        });
    }

    // Typed values, read the way the site loads them.
    let fields: EntryFields = frontmatter
        .fields()
        .map_err(|e| MalformedResponse::InvalidYaml(e.to_string()))?;

    let passage = frontmatter
        .text("passage")
        .ok_or(MalformedResponse::EmptyPassage)?;

    let date_raw = required(fields.date, "date")?;
    let date = NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d").map_err(|_| {
        MalformedResponse::InvalidField {
            field: "date",
            value: date_raw.clone(),
        }
    })?;

    let tags = check_tags(fields.tags.unwrap_or_default())?;
    let excerpt = fields.excerpt.unwrap_or(false);

    if let Some(link) = &fields.passage_link {
        if !excerpt {
            return Err(MalformedResponse::PassageLinkWithoutExcerpt);
        }
        if !is_web_url(link) {
            return Err(MalformedResponse::InvalidPassageLink(link.clone()));
        }
    }

    Ok(ParsedEntry {
        title: required(fields.title, "title")?,
        date,
        passage,
        author: required(fields.author, "author")?,
        source: required(fields.source, "source")?,
        source_year: fields.source_year.filter(|y| !y.trim().is_empty()),
        excerpt,
        passage_link: fields.passage_link,
        tags,
        body,
        frontmatter,
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, MalformedResponse> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(MalformedResponse::InvalidField {
            field,
            value: String::new(),
        })
}

/// 1 to `MAX_TAGS` distinct, non-blank tags.
fn check_tags(tags: Vec<String>) -> Result<Vec<String>, MalformedResponse> {
    let well_formed = (1..=MAX_TAGS).contains(&tags.len())
        && tags
            .iter()
            .enumerate()
            .all(|(i, tag)| !tag.trim().is_empty() && !tags[..i].contains(tag));
    if !well_formed {
        return Err(MalformedResponse::InvalidField {
            field: "tags",
            value: tags.join(", "),
        });
    }
    Ok(tags)
}

/// Well-formedness only; whether the page exists is not checked.
fn is_web_url(link: &str) -> bool {
    Url::parse(link)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}
