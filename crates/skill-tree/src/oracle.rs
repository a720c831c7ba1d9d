//! The "expand one topic" seam and the boundary that normalizes its answers.
//!
//! **Interaction**: `TreeExpander` calls `TopicOracle::expand_topic` once per
//! expanded topic. `LlmTopicOracle` implements it over an `LlmClient` and runs
//! every reply through `parse_node_output`; `MockOracle` scripts it for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::llm::LlmError;
use crate::model::{fresh_id, NodeResult, QuizQuestion, Resource, Topic};

/// Why an oracle call produced no usable answer.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The underlying LLM call failed.
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),

    /// The answer could not be parsed into the node shape.
    #[error("malformed oracle output: {0}")]
    Malformed(String),

    /// Any other failure reported by the oracle.
    #[error("oracle failed: {0}")]
    Failed(String),
}

/// What the oracle knows about where a topic sits in the tree being built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OracleContext {
    /// Root topic of the whole run.
    pub root: Topic,
    /// Topics from the root down to (excluding) the topic being expanded.
    pub path: Vec<Topic>,
    /// Depth of the topic being expanded; the root is 0.
    pub depth: u32,
}

/// Given a topic, returns resources, quiz questions and harder related topics.
///
/// Implementations must answer `related_harder_topics: []` for a leaf and must
/// not invent related topics when they fail; return an error instead.
#[async_trait]
pub trait TopicOracle: Send + Sync {
    async fn expand_topic(&self, topic: &str, ctx: &OracleContext) -> Result<NodeResult, OracleError>;
}

#[async_trait]
impl<T: TopicOracle + ?Sized> TopicOracle for Arc<T> {
    async fn expand_topic(&self, topic: &str, ctx: &OracleContext) -> Result<NodeResult, OracleError> {
        (**self).expand_topic(topic, ctx).await
    }
}

#[async_trait]
impl<'a, T: TopicOracle + ?Sized> TopicOracle for &'a T {
    async fn expand_topic(&self, topic: &str, ctx: &OracleContext) -> Result<NodeResult, OracleError> {
        (**self).expand_topic(topic, ctx).await
    }
}

/// Raw oracle answer before normalization.
#[derive(Debug, Deserialize)]
struct RawNodeOutput {
    #[serde(default)]
    topic: Option<Value>,
    #[serde(default)]
    resources: Option<Value>,
    #[serde(default)]
    quiz_questions: Option<Value>,
    #[serde(default)]
    related_harder_topics: Option<Value>,
}

/// Strips an optional ```` ```json ... ``` ```` (or bare ```` ``` ````) fence.
pub(crate) fn extract_json(content: &str) -> &str {
    let content = content.trim();
    content
        .strip_prefix("```json")
        .or_else(|| content.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(content)
}

/// Absent or null is `[]`; anything but a list is malformed.
fn list_field(value: Option<Value>, field: &str) -> Result<Vec<Value>, OracleError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(OracleError::Malformed(format!("{field} is not a list: {other}"))),
    }
}

/// Entries are passed through as given. A non-list payload is dropped rather
/// than failing the whole node.
fn payload_list(value: Option<Value>, field: &str) -> Vec<Value> {
    list_field(value, field).unwrap_or_else(|e| {
        warn!(error = %e, "dropping malformed payload");
        Vec::new()
    })
}

/// Keeps string entries exactly as given; non-string and null entries are skipped.
fn normalize_related(value: Option<Value>) -> Result<Vec<Topic>, OracleError> {
    let items = list_field(value, "related_harder_topics")?;
    let mut topics = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::String(s) => topics.push(s),
            other => warn!(index, entry = %other, "skipping malformed related topic"),
        }
    }
    Ok(topics)
}

/// Parses one oracle answer (JSON object, optionally fenced) into a `NodeResult`.
///
/// The result always gets a fresh `id` (any id in the answer is ignored) and
/// never has children.
pub fn parse_node_output(content: &str) -> Result<NodeResult, OracleError> {
    let json = extract_json(content);
    let raw: RawNodeOutput = serde_json::from_str(json)
        .map_err(|e| OracleError::Malformed(format!("{e}; raw: {content}")))?;
    Ok(NodeResult {
        topic: raw
            .topic
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default(),
        resources: payload_list(raw.resources, "resources")
            .into_iter()
            .map(Resource)
            .collect(),
        quiz_questions: payload_list(raw.quiz_questions, "quiz_questions")
            .into_iter()
            .map(QuizQuestion)
            .collect(),
        related_harder_topics: normalize_related(raw.related_harder_topics)?,
        id: fresh_id(),
        children: Vec::new(),
        termination: None,
    })
}

#[derive(Default)]
struct MockState {
    calls: Vec<(Topic, OracleContext)>,
}

/// Scripted oracle: a fixed answer per topic.
///
/// Topics without a script answer as leaves. Topics marked with
/// [`MockOracle::fail_on`] return `OracleError::Failed`. Every call is
/// logged with its context.
#[derive(Default)]
pub struct MockOracle {
    answers: HashMap<Topic, NodeResult>,
    failing: HashSet<Topic>,
    state: Mutex<MockState>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `topic` with the given related harder topics.
    pub fn with<I, S>(self, topic: &str, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Topic>,
    {
        self.with_answer(NodeResult::new(topic).with_related(related))
    }

    /// Answer `answer.topic` with a full node (resources, questions, related).
    pub fn with_answer(mut self, answer: NodeResult) -> Self {
        self.answers.insert(answer.topic.clone(), answer);
        self
    }

    /// Make every call for `topic` fail.
    pub fn fail_on(mut self, topic: &str) -> Self {
        self.failing.insert(topic.to_string());
        self
    }

    /// Topics requested so far, in call order.
    pub fn calls(&self) -> Vec<Topic> {
        self.state
            .lock()
            .map(|s| s.calls.iter().map(|(t, _)| t.clone()).collect())
            .unwrap_or_default()
    }

    /// Contexts passed so far, in call order.
    pub fn contexts(&self) -> Vec<OracleContext> {
        self.state
            .lock()
            .map(|s| s.calls.iter().map(|(_, c)| c.clone()).collect())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().map(|s| s.calls.len()).unwrap_or_default()
    }

    /// Number of calls made for `topic`.
    pub fn calls_for(&self, topic: &str) -> usize {
        self.calls().iter().filter(|t| t.as_str() == topic).count()
    }
}

#[async_trait]
impl TopicOracle for MockOracle {
    async fn expand_topic(&self, topic: &str, ctx: &OracleContext) -> Result<NodeResult, OracleError> {
        if let Ok(mut state) = self.state.lock() {
            state.calls.push((topic.to_string(), ctx.clone()));
        }
        if self.failing.contains(topic) {
            return Err(OracleError::Failed(format!("scripted failure for {topic}")));
        }
        let mut answer = self
            .answers
            .get(topic)
            .cloned()
            .unwrap_or_else(|| NodeResult::new(topic));
        answer.id = fresh_id();
        Ok(answer)
    }
}
