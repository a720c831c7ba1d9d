//! Mock LLM for tests and offline demos.
//!
//! Replies with a fixed string, or walks a script of replies in order
//! (repeating the last one once exhausted). Every prompt it receives is
//! recorded so tests can assert on what was asked.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{LlmClient, LlmResponse, Message};
use super::error::LlmError;

/// Scripted `LlmClient`.
///
/// **Interaction**: Implements `LlmClient`; used by `LlmTopicOracle` and
/// `starting_topic` tests.
pub struct MockLlm {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    last: Mutex<Option<Result<String, LlmError>>>,
    prompts: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Always reply with `content`.
    pub fn with_fixed_response(content: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(content.into())])
    }

    /// Always fail with `err`.
    pub fn failing(err: LlmError) -> Self {
        Self::scripted(vec![Err(err)])
    }

    /// Reply with each entry in turn; the last entry repeats.
    pub fn scripted(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Message lists received so far, in call order.
    pub fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(messages.to_vec());
        }
        let next = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        let reply = match next {
            Some(reply) => {
                if let Ok(mut last) = self.last.lock() {
                    *last = Some(reply.clone());
                }
                reply
            }
            None => self
                .last
                .lock()
                .ok()
                .and_then(|l| l.clone())
                .unwrap_or_else(|| Ok(String::new())),
        };
        reply.map(|content| LlmResponse { content })
    }
}
