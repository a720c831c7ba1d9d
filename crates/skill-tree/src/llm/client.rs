//! `LlmClient` trait and the message types it exchanges.

use async_trait::async_trait;

use super::error::LlmError;

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// System prompt; typically first in the list.
    System(String),
    /// User input.
    User(String),
    /// Model reply.
    Assistant(String),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    /// The wire role name.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant(_) => "assistant",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::System(s) | Message::User(s) | Message::Assistant(s) => s,
        }
    }
}

/// The assistant's reply to one `invoke`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmResponse {
    pub content: String,
}

/// Async chat interface: send the full message list, get one reply.
///
/// **Interaction**: Held as `Arc<dyn LlmClient>` by `LlmTopicOracle` and by
/// the starting-topic step of the pipeline.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError>;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        (**self).invoke(messages).await
    }
}
