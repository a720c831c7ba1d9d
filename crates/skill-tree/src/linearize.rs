//! GraphLinearizer: flattens a nested skill tree into React Flow nodes and edges.
//!
//! Depth-first pre-order; each emitted node gets the next sequential id
//! (`"1"` for the root). Duplicate topics are dropped across the whole run
//! ([`RunGlobalDedup`]), which is stricter than the per-branch policy used
//! while expanding. Nodes that only carry a flat `related_harder_topics` list
//! get one placeholder leaf per related topic.
//!
//! **Interaction**: Consumes the `NodeResult` tree from `TreeExpander` (or a
//! hand-built / partially expanded one); the `SkillGraph` it returns is what
//! gets persisted and rendered.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{fresh_id, NodeResult, QuizQuestion, Resource, Topic};

/// Suffix appended to a placeholder node's label.
pub const PLACEHOLDER_SUFFIX: &str = " (placeholder)";

/// Topics already emitted in this `linearize` run.
#[derive(Debug, Clone, Default)]
pub struct RunGlobalDedup {
    seen: HashSet<Topic>,
}

impl RunGlobalDedup {
    pub fn contains(&self, topic: &str) -> bool {
        self.seen.contains(topic)
    }

    /// Returns false if `topic` was already emitted.
    pub fn insert(&mut self, topic: &str) -> bool {
        self.seen.insert(topic.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Default,
}

/// Initial layout position; the UI runs its own layout pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Payload of one graph node, copied from the `NodeResult` it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNodeData {
    pub label: String,
    pub topic: Topic,
    pub resources: Vec<Resource>,
    pub quiz_questions: Vec<QuizQuestion>,
    pub related_harder_topics: Vec<Topic>,
    pub uuid: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_placeholder: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Sequential per run, as a string.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub data: GraphNodeData,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// The persisted `{nodes, edges}` document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl SkillGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_by_topic(&self, topic: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.data.topic == topic && !n.data.is_placeholder)
    }

    /// Ids of the direct children of `id`, in edge order.
    pub fn children_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .map(|e| e.target.as_str())
            .collect()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| n.data.is_placeholder)
    }
}

/// Flattens trees into `SkillGraph`s, bounded by `max_depth`.
#[derive(Debug, Clone, Copy)]
pub struct GraphLinearizer {
    max_depth: u32,
}

/// Per-run state: id counter, dedup set and output lists.
struct Walk {
    max_depth: u32,
    next_id: u64,
    processed: RunGlobalDedup,
    graph: SkillGraph,
}

impl Walk {
    fn allocate_id(&mut self) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        id
    }

    fn push(&mut self, node: GraphNode, parent_id: Option<&str>) {
        if let Some(parent) = parent_id {
            self.graph.edges.push(GraphEdge {
                source: parent.to_string(),
                target: node.id.clone(),
            });
        }
        self.graph.nodes.push(node);
    }

    /// Emits `node` and its subtree; returns the new node's id, or `None` when
    /// the node was cut by depth or dedup.
    fn visit(&mut self, node: &NodeResult, parent_id: Option<&str>, depth: u32) -> Option<String> {
        if depth >= self.max_depth {
            return None;
        }
        if !self.processed.insert(&node.topic) {
            debug!(topic = %node.topic, "duplicate topic dropped");
            return None;
        }

        let id = self.allocate_id();
        let kind = if parent_id.is_none() {
            NodeKind::Root
        } else {
            NodeKind::Default
        };
        self.push(
            GraphNode {
                id: id.clone(),
                kind,
                data: GraphNodeData {
                    label: node.topic.clone(),
                    topic: node.topic.clone(),
                    resources: node.resources.clone(),
                    quiz_questions: node.quiz_questions.clone(),
                    related_harder_topics: node.related_harder_topics.clone(),
                    uuid: node.id.clone(),
                    is_placeholder: false,
                },
                position: Position::default(),
            },
            parent_id,
        );

        if !node.children.is_empty() {
            for child in &node.children {
                self.visit(child, Some(&id), depth + 1);
            }
        } else if depth + 1 < self.max_depth {
            for related in &node.related_harder_topics {
                self.placeholder(related, &id);
            }
        }
        Some(id)
    }

    fn placeholder(&mut self, topic: &str, parent_id: &str) {
        let id = self.allocate_id();
        self.push(
            GraphNode {
                id,
                kind: NodeKind::Default,
                data: GraphNodeData {
                    label: format!("{topic}{PLACEHOLDER_SUFFIX}"),
                    topic: topic.to_string(),
                    resources: Vec::new(),
                    quiz_questions: Vec::new(),
                    related_harder_topics: Vec::new(),
                    uuid: fresh_id(),
                    is_placeholder: true,
                },
                position: Position::default(),
            },
            Some(parent_id),
        );
    }
}

impl GraphLinearizer {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Flattens `root`. Each call starts a fresh id counter and dedup set.
    pub fn linearize(&self, root: &NodeResult) -> SkillGraph {
        let mut walk = Walk {
            max_depth: self.max_depth,
            next_id: 1,
            processed: RunGlobalDedup::default(),
            graph: SkillGraph::default(),
        };
        walk.visit(root, None, 0);
        debug!(
            nodes = walk.graph.nodes.len(),
            edges = walk.graph.edges.len(),
            "skill tree linearized"
        );
        walk.graph
    }
}

/// Shorthand for `GraphLinearizer::new(max_depth).linearize(root)`.
pub fn linearize(root: &NodeResult, max_depth: u32) -> SkillGraph {
    GraphLinearizer::new(max_depth).linearize(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_serializes_react_flow_shape() {
        let graph = linearize(&NodeResult::new("Big O Notation"), 3);
        let json = serde_json::to_value(&graph).unwrap();
        let node = &json["nodes"][0];
        assert_eq!(node["id"], "1");
        assert_eq!(node["type"], "root");
        assert_eq!(node["data"]["label"], "Big O Notation");
        assert_eq!(node["position"]["x"], 0.0);
        assert!(node["data"].get("is_placeholder").is_none());
        assert_eq!(json["edges"], serde_json::json!([]));
    }

    #[test]
    fn placeholder_flag_is_serialized_when_set() {
        let root = NodeResult::new("Arrays").with_related(["Two Pointers"]);
        let json = serde_json::to_value(linearize(&root, 3)).unwrap();
        assert_eq!(json["nodes"][1]["type"], "default");
        assert_eq!(json["nodes"][1]["data"]["is_placeholder"], true);
        assert_eq!(json["nodes"][1]["data"]["label"], "Two Pointers (placeholder)");
    }

    #[test]
    fn run_dedup_is_reset_per_call() {
        let linearizer = GraphLinearizer::new(3);
        let root = NodeResult::new("Graphs");
        assert_eq!(linearizer.linearize(&root).nodes.len(), 1);
        assert_eq!(linearizer.linearize(&root).nodes.len(), 1);
    }

    #[test]
    fn graph_lookup_helpers() {
        let root = NodeResult::new("A").with_children(vec![NodeResult::new("B"), NodeResult::new("C")]);
        let graph = linearize(&root, 3);
        assert_eq!(graph.children_of("1"), ["2", "3"]);
        assert_eq!(graph.node_by_topic("C").map(|n| n.id.as_str()), Some("3"));
        assert!(graph.node("4").is_none());
        assert_eq!(graph.placeholders().count(), 0);
    }
}
