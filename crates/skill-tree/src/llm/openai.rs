//! OpenAI-compatible Chat Completions client (`ChatOpenAI`).
//!
//! Works against any endpoint speaking the `/chat/completions` protocol
//! (OpenAI, Azure proxies, self-hosted gateways).
//!
//! **Interaction**: Implements `LlmClient`; built by the generator CLI from
//! `OPENAI_API_KEY` / `OPENAI_API_BASE` and handed to `LlmTopicOracle`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::{LlmClient, LlmResponse, Message};
use super::error::LlmError;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection and sampling settings.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Base URL without trailing slash, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            model: model.into(),
            temperature: None,
        }
    }

    /// `OPENAI_API_KEY` is required and must be non-empty; `OPENAI_API_BASE`
    /// and `OPENAI_MODEL` are optional.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let api_key = lookup("OPENAI_API_KEY")
            .map(|key| key.trim().to_string())
            .unwrap_or_default();
        if api_key.is_empty() {
            return Err(LlmError::Auth(
                "OPENAI_API_KEY is not set or empty (whole key on one line in .env)".to_string(),
            ));
        }
        let model = lookup("OPENAI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let mut config = Self::new(api_key, model.trim());
        if let Some(base_url) = lookup("OPENAI_API_BASE").filter(|b| !b.trim().is_empty()) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat Completions client implementing `LlmClient`.
#[derive(Debug, Clone)]
pub struct ChatOpenAI {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl ChatOpenAI {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_body<'a>(&'a self, messages: &'a [Message]) -> RequestBody<'a> {
        RequestBody {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| RequestMessage {
                    role: m.role(),
                    content: m.content(),
                })
                .collect(),
            temperature: self.config.temperature,
        }
    }
}

fn error_for_status(status: u16, text: String) -> LlmError {
    match status {
        401 | 403 => LlmError::Auth(text),
        429 => LlmError::RateLimit(text),
        400..=499 => LlmError::InvalidRequest(text),
        _ => LlmError::Api(text),
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = self.build_body(messages);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(error_for_status(status.as_u16(), text));
        }
        let parsed: ResponseBody = serde_json::from_str(&text)
            .map_err(|e| LlmError::Parsing(format!("{e}: {text}")))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parsing("response has no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();
        Ok(LlmResponse { content })
    }
}
