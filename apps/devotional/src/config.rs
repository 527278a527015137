use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::errors::PipelineError;
use crate::llm_client::{LlmSettings, Provider, DEFAULT_TIMEOUT_SECS};

/// Filesystem locations for one site instance.
#[derive(Debug, Clone)]
pub struct Paths {
    pub entries_dir: PathBuf,
    pub registry_file: PathBuf,
    pub sources_file: PathBuf,
}

/// Generation settings loaded from environment variables.
/// Only the `generate` command needs them.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let provider = match std::env::var("LLM_PROVIDER") {
            Ok(raw) => raw.parse::<Provider>().map_err(anyhow::Error::msg)?,
            Err(_) => Provider::OpenRouter,
        };

        Ok(Config {
            llm: LlmSettings {
                provider,
                api_key: require_env(provider.api_key_var())?,
                model: std::env::var("LLM_MODEL")
                    .unwrap_or_else(|_| provider.default_model().to_string()),
                url: std::env::var("LLM_BASE_URL")
                    .unwrap_or_else(|_| provider.default_url().to_string()),
                timeout_secs: match std::env::var("LLM_TIMEOUT_SECS") {
                    Ok(raw) => raw
                        .parse::<u64>()
                        .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
                    Err(_) => DEFAULT_TIMEOUT_SECS,
                },
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Editorial configuration (`sources.json`): what the site writes about.
/// Opaque to the pipeline apart from being interpolated into the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditorialConfig {
    #[serde(default = "default_site_name", alias = "siteName")]
    pub site_name: String,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub suggested_authors: Vec<String>,
    #[serde(default)]
    pub tag_vocabulary: Vec<String>,
}

fn default_site_name() -> String {
    "The Human Element".to_string()
}

impl EditorialConfig {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::fs(path, e))?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            PipelineError::Config(format!("{} is not a valid sources file: {e}", path.display()))
        })?;
        if config.tag_vocabulary.is_empty() {
            return Err(PipelineError::Config(format!(
                "{} must list at least one tag in tag_vocabulary",
                path.display()
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editorial_config_loads_sources_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(
            &path,
            r#"{
                "themes": ["craft", "attention"],
                "suggested_authors": ["Mary Oliver"],
                "tag_vocabulary": ["craft", "attention", "play"]
            }"#,
        )
        .unwrap();

        let config = EditorialConfig::load(&path).unwrap();
        assert_eq!(config.site_name, "The Human Element");
        assert_eq!(config.themes, vec!["craft", "attention"]);
        assert_eq!(config.tag_vocabulary.len(), 3);
    }

    #[test]
    fn test_editorial_config_site_name_override() {
        let config: EditorialConfig = serde_json::from_str(
            r#"{"siteName": "Daily Sublime", "tag_vocabulary": ["awe"]}"#,
        )
        .unwrap();
        assert_eq!(config.site_name, "Daily Sublime");
        assert!(config.suggested_authors.is_empty());
    }

    #[test]
    fn test_editorial_config_requires_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(&path, r#"{"themes": ["x"]}"#).unwrap();

        assert!(matches!(
            EditorialConfig::load(&path),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_editorial_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EditorialConfig::load(&dir.path().join("nope.json")),
            Err(PipelineError::FileSystem { .. })
        ));
    }
}
