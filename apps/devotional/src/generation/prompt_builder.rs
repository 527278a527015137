//! Prompt Builder: pure assembly of the generation request from editorial
//! config, recent history, and the registry's known sources.

use chrono::NaiveDate;

use crate::config::EditorialConfig;
use crate::entries::scheduler::RecentHistory;
use crate::generation::prompts::{
    NONE_YET, OUTPUT_FORMAT_TEMPLATE, SYSTEM_PROMPT_TEMPLATE, USER_PROMPT_TEMPLATE,
};
use crate::llm_client::Prompt;
use crate::models::passage::SourceRef;

pub fn build_prompt(
    config: &EditorialConfig,
    history: &RecentHistory,
    sources: &[SourceRef],
    target_date: NaiveDate,
) -> Prompt {
    let target_date = target_date.format("%Y-%m-%d").to_string();
    let output_format = OUTPUT_FORMAT_TEMPLATE.replace("{target_date}", &target_date);

    let system = SYSTEM_PROMPT_TEMPLATE
        .replace("{site_name}", &config.site_name)
        .replace("{themes}", &join_or_none(&config.themes))
        .replace("{suggested_authors}", &join_or_none(&config.suggested_authors))
        .replace("{recent_authors}", &join_or_none(&history.authors))
        .replace("{recent_tags}", &join_or_none(&history.tags))
        .replace("{known_sources}", &format_sources(sources))
        .replace("{tag_vocabulary}", &config.tag_vocabulary.join(", "))
        .replace("{output_format}", &output_format);

    let user = USER_PROMPT_TEMPLATE
        .replace("{site_name}", &config.site_name)
        .replace("{target_date}", &target_date);

    Prompt { system, user }
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        NONE_YET.to_string()
    } else {
        values.join(", ")
    }
}

fn format_sources(sources: &[SourceRef]) -> String {
    if sources.is_empty() {
        return NONE_YET.to_string();
    }
    sources
        .iter()
        .map(|s| match &s.source_year {
            Some(year) => format!("{}, \"{}\" ({year})", s.author, s.source),
            None => format!("{}, \"{}\"", s.author, s.source),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
