//! Pipeline: subject → starting topic → expanded tree → graph.
//!
//! **Interaction**: Built once by `main` (or per server) from an `LlmClient`
//! and shared behind `Arc`; `run` is called per subject.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use skill_tree::{
    starting_topic, ExpansionStats, GraphLinearizer, LlmClient, LlmTopicOracle, NodeResult,
    OnOracleFailure, SkillGraph, SkillTreeResult, Topic, TopicOracle, TreeExpander,
};

/// Knobs for one pipeline; see `ExpandArgs` for the CLI side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    pub depth: u32,
    pub graph_depth: u32,
    pub max_children: Option<usize>,
    pub on_failure: OnOracleFailure,
    /// Ask the model for a starting topic instead of using the subject as is.
    pub simplify: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            depth: crate::config::DEFAULT_DEPTH,
            graph_depth: crate::config::DEFAULT_DEPTH,
            max_children: None,
            on_failure: OnOracleFailure::Abort,
            simplify: true,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PipelineOutput {
    pub root_topic: Topic,
    pub tree: NodeResult,
    pub graph: SkillGraph,
    #[serde(skip)]
    pub stats: ExpansionStats,
}

pub struct Pipeline {
    llm: Arc<dyn LlmClient>,
    oracle: Arc<dyn TopicOracle>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Pipeline whose oracle is an `LlmTopicOracle` over `llm` with `node_prompt`.
    pub fn new(llm: Arc<dyn LlmClient>, node_prompt: impl Into<String>, options: PipelineOptions) -> Self {
        let oracle = LlmTopicOracle::new(llm.clone()).with_system_prompt(node_prompt);
        Self::with_oracle(llm, Arc::new(oracle), options)
    }

    /// Pipeline with a custom oracle; `llm` is only used for the starting topic.
    pub fn with_oracle(
        llm: Arc<dyn LlmClient>,
        oracle: Arc<dyn TopicOracle>,
        options: PipelineOptions,
    ) -> Self {
        Self { llm, oracle, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Runs with the configured depths.
    pub async fn run(&self, subject: &str) -> SkillTreeResult<PipelineOutput> {
        self.run_with_depth(subject, None).await
    }

    /// Runs with `depth` overriding both expansion and graph depth when given.
    pub async fn run_with_depth(&self, subject: &str, depth: Option<u32>) -> SkillTreeResult<PipelineOutput> {
        let (expand_depth, graph_depth) = match depth {
            Some(d) => (d, d),
            None => (self.options.depth, self.options.graph_depth),
        };

        let root_topic = if self.options.simplify {
            starting_topic(self.llm.as_ref(), subject).await?
        } else {
            subject.trim().to_string()
        };
        info!(subject, root_topic = %root_topic, expand_depth, graph_depth, "pipeline started");

        let expander = TreeExpander::new(self.oracle.clone())
            .with_max_children(self.options.max_children)
            .with_failure_policy(self.options.on_failure);
        let (tree, stats) = expander.expand_with_stats(&root_topic, expand_depth).await?;
        let graph = GraphLinearizer::new(graph_depth).linearize(&tree);

        info!(
            root_topic = %root_topic,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            oracle_calls = stats.oracle_calls,
            "pipeline finished"
        );
        Ok(PipelineOutput {
            root_topic,
            tree,
            graph,
            stats,
        })
    }
}
