//! LLM client: the single point of entry for the external generation call.
//!
//! ARCHITECTURAL RULE: no other module talks to a model provider directly.
//! The orchestrator only sees the `Generator` trait, so tests can feed it
//! canned (and deliberately broken) responses.
//!
//! Calls are never retried. A failed or empty call aborts the run and the
//! next scheduled run tries again.
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const DEFAULT_OPENROUTER_MODEL: &str = "moonshotai/kimi-k2.5";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
/// Thinking models spend part of this budget on reasoning tokens.
const MAX_TOKENS: u32 = 16_000;
const TEMPERATURE: f32 = 0.9;
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A generation request: system instructions plus the user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// The external text generator. Prompt in, raw text out.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI-compatible chat completions.
    OpenRouter,
    /// Anthropic Messages API.
    Anthropic,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenRouter => DEFAULT_OPENROUTER_MODEL,
            Provider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
    }

    pub fn default_url(self) -> &'static str {
        match self {
            Provider::OpenRouter => OPENROUTER_API_URL,
            Provider::Anthropic => ANTHROPIC_API_URL,
        }
    }

    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" | "openai" => Ok(Provider::OpenRouter),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(format!(
                "unknown LLM provider '{other}' (expected 'openrouter' or 'anthropic')"
            )),
        }
    }
}

/// Everything needed to reach a provider.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub url: String,
    pub timeout_secs: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Both providers wrap errors as `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn chat_completion_text(body: &str) -> Result<Option<String>, LlmError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)?;
    if let Some(usage) = &response.usage {
        debug!(
            "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
            usage.prompt_tokens, usage.completion_tokens
        );
    }
    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content))
}

fn anthropic_text(body: &str) -> Result<Option<String>, LlmError> {
    let response: AnthropicResponse = serde_json::from_str(body)?;
    if let Some(usage) = &response.usage {
        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            usage.input_tokens, usage.output_tokens
        );
    }
    Ok(response
        .content
        .into_iter()
        .find(|b| b.block_type == "text")
        .and_then(|b| b.text))
}

/// Trimmed content, or `EmptyContent` when there is nothing to validate.
fn non_empty(text: Option<String>) -> Result<String, LlmError> {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(LlmError::EmptyContent)
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Sends one request and returns the trimmed text of the reply.
    pub async fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let settings = &self.settings;
        let request = match settings.provider {
            Provider::OpenRouter => self
                .client
                .post(&settings.url)
                .bearer_auth(&settings.api_key)
                .json(&ChatCompletionRequest {
                    model: &settings.model,
                    max_tokens: MAX_TOKENS,
                    temperature: TEMPERATURE,
                    messages: vec![
                        ChatMessage {
                            role: "system",
                            content: &prompt.system,
                        },
                        ChatMessage {
                            role: "user",
                            content: &prompt.user,
                        },
                    ],
                }),
            Provider::Anthropic => self
                .client
                .post(&settings.url)
                .header("x-api-key", &settings.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&AnthropicRequest {
                    model: &settings.model,
                    max_tokens: MAX_TOKENS,
                    temperature: TEMPERATURE,
                    system: &prompt.system,
                    messages: vec![ChatMessage {
                        role: "user",
                        content: &prompt.user,
                    }],
                }),
        };

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = match settings.provider {
            Provider::OpenRouter => chat_completion_text(&body)?,
            Provider::Anthropic => anthropic_text(&body)?,
        };
        non_empty(text)
    }

    fn classify(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout(self.settings.timeout_secs)
        } else {
            LlmError::Http(error)
        }
    }
}

#[async_trait]
impl Generator for LlmClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError> {
        info!(
            "Calling {} (thinking models can take a minute or two)...",
            self.settings.model
        );
        let text = self.complete(prompt).await?;
        info!("Response received ({} chars)", text.len());
        Ok(text)
    }
}
