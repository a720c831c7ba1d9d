//! Skill-tree-gen: builds a learning skill tree for a broad subject with an LLM.
//!
//! Picks a starting topic, expands it with `skill_tree::TreeExpander`, and
//! flattens the result into a React Flow graph. Runs as a one-shot CLI or as
//! a small HTTP service.

pub mod config;
pub mod pipeline;
pub mod server;

pub use config::{load_prompt, resolve_prompt_path, Config, ExpandArgs, FailureMode};
pub use pipeline::{Pipeline, PipelineOptions, PipelineOutput};
pub use server::{router, run_server, ApiError, GenerateRequest, GenerateResponse};
