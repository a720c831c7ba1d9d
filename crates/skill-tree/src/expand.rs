//! TreeExpander: recursive, depth-bounded expansion of a root topic.
//!
//! Depth-first and eager. Each expanded topic costs exactly one oracle call;
//! children are awaited one at a time so the tree keeps the oracle's order.
//! Cycles are cut with a per-branch visited set ([`BranchLocalDedup`]): the
//! same topic may appear in two sibling branches, never twice on one path.
//!
//! **Interaction**: Holds any `TopicOracle`; the resulting `NodeResult` tree is
//! handed to `GraphLinearizer`.

use std::collections::HashSet;

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{NodeResult, TerminationReason, Topic};
use crate::oracle::{OracleContext, OracleError, TopicOracle};

/// Topics already expanded on the path from the root to the current node.
///
/// Cloned into every recursive call, so siblings explore independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchLocalDedup {
    seen: HashSet<Topic>,
    path: Vec<Topic>,
}

impl BranchLocalDedup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.seen.contains(topic)
    }

    /// Marks `topic` as visited on this branch. Returns false if it already was.
    pub fn insert(&mut self, topic: &str) -> bool {
        if !self.seen.insert(topic.to_string()) {
            return false;
        }
        self.path.push(topic.to_string());
        true
    }

    /// Visited topics in root-to-node order.
    pub fn path(&self) -> &[Topic] {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// What to do when the oracle fails for one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnOracleFailure {
    /// Fail the whole expansion.
    #[default]
    Abort,
    /// Put an empty `OracleFailed` stub in place of the topic and continue.
    Stub,
}

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("expanding \"{topic}\" failed: {source}")]
    Oracle {
        topic: Topic,
        #[source]
        source: OracleError,
    },
}

/// Counters for one `expand` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    pub oracle_calls: usize,
    pub nodes: usize,
    pub leaves: usize,
    pub depth_capped: usize,
    pub cycles: usize,
    pub failures: usize,
}

impl ExpansionStats {
    fn record(&mut self, reason: TerminationReason) {
        match reason {
            TerminationReason::Leaf => self.leaves += 1,
            TerminationReason::DepthCapped => self.depth_capped += 1,
            TerminationReason::CycleDetected => self.cycles += 1,
            TerminationReason::OracleFailed => self.failures += 1,
        }
    }
}

/// Builds a bounded-depth tree by asking the oracle about each topic.
pub struct TreeExpander<O> {
    oracle: O,
    max_children: Option<usize>,
    on_failure: OnOracleFailure,
}

impl<O: TopicOracle> TreeExpander<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            max_children: None,
            on_failure: OnOracleFailure::default(),
        }
    }

    /// Caps how many related topics are expanded per node (after dedup filtering).
    pub fn with_max_children(mut self, max_children: Option<usize>) -> Self {
        self.max_children = max_children;
        self
    }

    pub fn with_failure_policy(mut self, on_failure: OnOracleFailure) -> Self {
        self.on_failure = on_failure;
        self
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Expands `root` into a tree at most `max_depth` levels deep.
    ///
    /// `max_depth == 0` returns a single depth-capped stub without calling the oracle.
    pub async fn expand(&self, root: &str, max_depth: u32) -> Result<NodeResult, ExpandError> {
        self.expand_with_stats(root, max_depth).await.map(|(tree, _)| tree)
    }

    pub async fn expand_with_stats(
        &self,
        root: &str,
        max_depth: u32,
    ) -> Result<(NodeResult, ExpansionStats), ExpandError> {
        let mut stats = ExpansionStats::default();
        let tree = self
            .build(root, root.to_string(), 0, max_depth, BranchLocalDedup::new(), &mut stats)
            .await?;
        info!(
            root,
            max_depth,
            nodes = stats.nodes,
            oracle_calls = stats.oracle_calls,
            depth_capped = stats.depth_capped,
            cycles = stats.cycles,
            failures = stats.failures,
            "skill tree expanded"
        );
        Ok((tree, stats))
    }

    fn build<'a>(
        &'a self,
        root: &'a str,
        topic: Topic,
        depth: u32,
        max_depth: u32,
        mut visited: BranchLocalDedup,
        stats: &'a mut ExpansionStats,
    ) -> BoxFuture<'a, Result<NodeResult, ExpandError>> {
        Box::pin(async move {
            stats.nodes += 1;
            if depth >= max_depth {
                stats.record(TerminationReason::DepthCapped);
                return Ok(NodeResult::stub(topic, TerminationReason::DepthCapped));
            }
            if visited.contains(&topic) {
                stats.record(TerminationReason::CycleDetected);
                return Ok(NodeResult::stub(topic, TerminationReason::CycleDetected));
            }

            let ctx = OracleContext {
                root: root.to_string(),
                path: visited.path().to_vec(),
                depth,
            };
            visited.insert(&topic);

            debug!(topic = %topic, depth, "expanding topic");
            stats.oracle_calls += 1;
            let mut node = match self.oracle.expand_topic(&topic, &ctx).await {
                Ok(node) => node,
                Err(source) => match self.on_failure {
                    OnOracleFailure::Abort => return Err(ExpandError::Oracle { topic, source }),
                    OnOracleFailure::Stub => {
                        warn!(topic = %topic, error = %source, "oracle failed; substituting stub");
                        stats.record(TerminationReason::OracleFailed);
                        return Ok(NodeResult::stub(topic, TerminationReason::OracleFailed));
                    }
                },
            };
            node.topic = topic;
            node.children.clear();
            node.termination = None;

            if node.related_harder_topics.is_empty() {
                stats.record(TerminationReason::Leaf);
                node.termination = Some(TerminationReason::Leaf);
                return Ok(node);
            }

            let candidates: Vec<Topic> = node
                .related_harder_topics
                .iter()
                .filter(|related| !visited.contains(related) && depth + 1 < max_depth)
                .take(self.max_children.unwrap_or(usize::MAX))
                .cloned()
                .collect();

            let mut children = Vec::with_capacity(candidates.len());
            for related in candidates {
                let child = self
                    .build(root, related, depth + 1, max_depth, visited.clone(), &mut *stats)
                    .await?;
                children.push(child);
            }
            node.children = children;
            Ok(node)
        })
    }
}
