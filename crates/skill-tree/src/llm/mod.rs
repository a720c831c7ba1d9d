//! LLM client seam used by the LLM-backed topic oracle.
//!
//! - `LlmClient`: async chat interface (`invoke` a message list, get one reply)
//! - `ChatOpenAI`: OpenAI-compatible Chat Completions client over reqwest
//! - `MockLlm`: fixed or scripted replies for tests
//! - `LlmError`: call failures

mod client;
mod error;
mod mock;
mod openai;

pub use client::{LlmClient, LlmResponse, Message};
pub use error::LlmError;
pub use mock::MockLlm;
pub use openai::{ChatOpenAI, OpenAiConfig, DEFAULT_API_BASE, DEFAULT_MODEL};
