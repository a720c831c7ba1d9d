//! Errors raised while calling an LLM.

use thiserror::Error;

/// Failure of one LLM call.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// The API answered with an error status (5xx or unexpected).
    #[error("api error: {0}")]
    Api(String),

    /// 429.
    #[error("rate limit: {0}")]
    RateLimit(String),

    /// 401 / 403, or a missing key.
    #[error("auth failed: {0}")]
    Auth(String),

    /// Any other 4xx.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be parsed.
    #[error("parsing failed: {0}")]
    Parsing(String),
}
