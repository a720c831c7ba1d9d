//! Crate-level error that wraps every failure the library can surface.
//!
//! Depth caps, cycles and duplicate suppression are not errors; only oracle
//! and persistence failures reach the caller.

use thiserror::Error;

use crate::expand::ExpandError;
use crate::llm::LlmError;
use crate::oracle::OracleError;
use crate::persist::PersistError;

#[derive(Debug, Error)]
pub enum SkillTreeError {
    #[error(transparent)]
    Expand(#[from] ExpandError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    /// The model gave no usable starting topic.
    #[error("no starting topic for subject \"{0}\"")]
    NoStartingTopic(String),
}

pub type SkillTreeResult<T> = Result<T, SkillTreeError>;
