//! Topic and node types shared by the expander and the linearizer.
//!
//! **Interaction**: `NodeResult` is what a `TopicOracle` returns for one topic;
//! `TreeExpander` fills `children`, `GraphLinearizer` reads the finished tree.
//! Field names follow the JSON the graph UI consumes (snake_case).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// A plain label for a unit of learnable subject matter.
///
/// Also the identity key for cycle and duplicate detection: two topics are the
/// same iff their strings are equal (case-sensitive, no normalization).
pub type Topic = String;

/// One learning resource for a topic (usually `title`, `url`, `type`).
///
/// Opaque to the core: whatever the oracle returned is kept verbatim,
/// including null fields, non-string values and unknown keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(pub Value);

impl Resource {
    pub fn new(title: &str, url: &str, kind: &str) -> Self {
        Self(json!({ "title": title, "url": url, "type": kind }))
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.0.get("url").and_then(Value::as_str)
    }

    /// course, book, tutorial, article, ...
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }
}

/// One multiple-choice quiz question (`question`, `option_a`..`option_d`,
/// `correct_answer`, `explanation`). Carried through the core unvalidated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizQuestion(pub Value);

impl QuizQuestion {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn question(&self) -> Option<&str> {
        self.field("question").and_then(Value::as_str)
    }

    /// "A", "B", "C" or "D" when the oracle followed the format.
    pub fn correct_answer(&self) -> Option<&str> {
        self.field("correct_answer").and_then(Value::as_str)
    }

    /// Rewrites every top-level string field with `f`; other values are untouched.
    pub fn map_text(mut self, f: impl Fn(&str) -> String) -> Self {
        if let Value::Object(fields) = &mut self.0 {
            for value in fields.values_mut() {
                if let Value::String(text) = value {
                    *text = f(text);
                }
            }
        }
        self
    }
}

/// Why a node has no children.
///
/// Depth cap, cycle short-circuit and true leaves all produce the same empty
/// shape; the tag lets callers tell them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The oracle answered with no related harder topics.
    Leaf,
    /// The node sits at or below the depth budget.
    DepthCapped,
    /// The topic is already on the root-to-node path.
    CycleDetected,
    /// The oracle call failed and a stub was substituted.
    OracleFailed,
}

/// The oracle's answer for one topic, plus the children filled in by
/// `TreeExpander`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub topic: Topic,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub quiz_questions: Vec<QuizQuestion>,
    /// Empty signals "leaf / no further expansion".
    #[serde(default)]
    pub related_harder_topics: Vec<Topic>,
    /// Fresh per instance; a payload field, never the graph node id.
    #[serde(rename = "uuid", alias = "id", default = "fresh_id")]
    pub id: String,
    /// Populated only by `TreeExpander`.
    #[serde(default)]
    pub children: Vec<NodeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationReason>,
}

pub(crate) fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

impl NodeResult {
    /// A node for `topic` with no resources, questions, related topics or children.
    pub fn new(topic: impl Into<Topic>) -> Self {
        Self {
            topic: topic.into(),
            resources: Vec::new(),
            quiz_questions: Vec::new(),
            related_harder_topics: Vec::new(),
            id: fresh_id(),
            children: Vec::new(),
            termination: None,
        }
    }

    /// The empty-children stub returned for depth-capped, revisited or failed topics.
    pub fn stub(topic: impl Into<Topic>, reason: TerminationReason) -> Self {
        Self {
            termination: Some(reason),
            ..Self::new(topic)
        }
    }

    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Topic>,
    {
        self.related_harder_topics = related.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_children(mut self, children: Vec<NodeResult>) -> Self {
        self.children = children;
        self
    }

    pub fn with_resources(mut self, resources: Vec<Resource>) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_quiz_questions(mut self, quiz_questions: Vec<QuizQuestion>) -> Self {
        self.quiz_questions = quiz_questions;
        self
    }

    /// True when the node has neither materialized children nor related topics.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.related_harder_topics.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(NodeResult::subtree_len).sum::<usize>()
    }

    /// Depth-first pre-order walk over this subtree.
    pub fn walk(&self) -> Vec<&NodeResult> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}
