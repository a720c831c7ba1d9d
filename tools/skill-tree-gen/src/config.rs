//! Configuration: API credentials, node prompt and expansion options.
//!
//! **Interaction**: Used by `main` to build the LLM client and the `Pipeline`.
//! Loads from environment and CLI args via `Config::from_env_and_args`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use skill_tree::{OnOracleFailure, OpenAiConfig, DEFAULT_NODE_PROMPT};

use crate::pipeline::PipelineOptions;

pub const DEFAULT_DEPTH: u32 = 3;
pub const TEMPERATURE: f32 = 0.3;

/// What to do when one topic's expansion fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum FailureMode {
    /// Stop the whole run.
    #[default]
    Abort,
    /// Keep going with an empty stub for the failed topic.
    Stub,
}

impl From<FailureMode> for OnOracleFailure {
    fn from(mode: FailureMode) -> Self {
        match mode {
            FailureMode::Abort => OnOracleFailure::Abort,
            FailureMode::Stub => OnOracleFailure::Stub,
        }
    }
}

/// Options shared by `generate` and `serve`.
#[derive(Args, Clone, Debug)]
pub struct ExpandArgs {
    /// Maximum tree depth for expansion (root = depth 0). 0 yields a single stub.
    #[arg(long, short, default_value_t = DEFAULT_DEPTH)]
    pub depth: u32,

    /// Maximum depth when building the graph. Defaults to --depth.
    #[arg(long)]
    pub graph_depth: Option<u32>,

    /// Expand at most this many related topics per node.
    #[arg(long)]
    pub max_children: Option<usize>,

    /// Chat model name. Default: OPENAI_MODEL env, else gpt-4o-mini
    #[arg(long)]
    pub model: Option<String>,

    /// Path to the node system prompt. Default: PROMPT_PATH env, else the built-in prompt
    #[arg(short, long)]
    pub prompt: Option<PathBuf>,

    /// Use the subject itself as the root topic instead of asking for a starting topic
    #[arg(long)]
    pub no_simplify: bool,

    /// Behaviour when a topic cannot be expanded
    #[arg(long, value_enum, default_value_t = FailureMode::Abort)]
    pub on_failure: FailureMode,
}

impl ExpandArgs {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            depth: self.depth,
            graph_depth: self.graph_depth.unwrap_or(self.depth),
            max_children: self.max_children,
            on_failure: self.on_failure.into(),
            simplify: !self.no_simplify,
        }
    }
}

/// Resolved configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub llm: OpenAiConfig,
    pub node_prompt: String,
    pub options: PipelineOptions,
}

impl Config {
    /// Resolves config from environment and CLI. Caller should run
    /// `dotenv::dotenv().ok()` before this.
    pub fn from_env_and_args(args: &ExpandArgs) -> Result<Self> {
        let llm = OpenAiConfig::from_env().context("put OPENAI_API_KEY in .env or environment")?;
        Self::from_parts(llm, args)
    }

    /// Applies CLI overrides on top of an already loaded `OpenAiConfig`.
    pub fn from_parts(llm: OpenAiConfig, args: &ExpandArgs) -> Result<Self> {
        let llm = match &args.model {
            Some(model) => llm.with_model(model.clone()),
            None => llm,
        }
        .with_temperature(TEMPERATURE);
        let node_prompt = load_prompt(resolve_prompt_path(args.prompt.clone()).as_deref())?;
        Ok(Self {
            llm,
            node_prompt,
            options: args.pipeline_options(),
        })
    }
}

/// `--prompt` > PROMPT_PATH env > none (built-in prompt).
pub fn resolve_prompt_path(prompt_arg: Option<PathBuf>) -> Option<PathBuf> {
    prompt_arg.or_else(|| std::env::var("PROMPT_PATH").ok().map(PathBuf::from))
}

/// Reads the prompt file if given, else returns the built-in node prompt.
/// A path that was asked for but is missing is an error.
pub fn load_prompt(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            let prompt = std::fs::read_to_string(path)
                .with_context(|| format!("read prompt file {}", path.display()))?;
            if prompt.trim().is_empty() {
                anyhow::bail!("prompt file {} is empty", path.display());
            }
            Ok(prompt)
        }
        None => Ok(DEFAULT_NODE_PROMPT.to_string()),
    }
}
