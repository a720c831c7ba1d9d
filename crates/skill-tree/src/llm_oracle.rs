//! LLM-backed `TopicOracle` and the starting-topic step.
//!
//! For each topic the model is asked for one JSON object (resources, quiz
//! questions, immediate-next harder topics) which goes through
//! `parse_node_output`. The branch path from `OracleContext` is put in the
//! prompt so the model can avoid proposing topics already on it.
//!
//! **Interaction**: Holds `Arc<dyn LlmClient>` (e.g. `ChatOpenAI`); used by the
//! generator pipeline as the oracle for `TreeExpander`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::SkillTreeError;
use crate::llm::{LlmClient, Message};
use crate::model::{NodeResult, QuizQuestion, Topic};
use crate::oracle::{parse_node_output, OracleContext, OracleError, TopicOracle};

/// Default system prompt for one topic expansion.
pub const DEFAULT_NODE_PROMPT: &str = r#"You are an expert curriculum architect and subject matter expert.
For the given topic, output a single JSON object only, no other text:
{
  "topic": "<the topic>",
  "resources": [{"title": "...", "url": "...", "type": "course|book|tutorial|article"}],
  "quiz_questions": [{"question": "...", "option_a": "...", "option_b": "...", "option_c": "...", "option_d": "...", "correct_answer": "A|B|C|D", "explanation": "..."}],
  "related_harder_topics": ["..."]
}
Rules:
- Give at least 3 resources.
- Give 3 to 5 quiz questions; every question has all four options and correct_answer is exactly A, B, C or D.
- related_harder_topics are the immediate next layer of complexity that builds on this topic. Do not skip ahead.
- Keep topics atomic: "Two Pointers" is a topic, "Two Pointers and Sliding Window" is not.
- Never list a topic that is already in the current learning path.
- If nothing harder builds on this topic, use "related_harder_topics": []."#;

const STARTING_TOPIC_PROMPT: &str = r#"You are an expert curriculum designer. Given a broad course subject, name the single most foundational starting topic: the "day 1" concept every other topic builds on.
Examples: "Data Structures and Algorithms" -> Big O Notation; "Frontend Web Development" -> HTML Basics; "Machine Learning" -> Linear Regression.
Respond with the topic name only, as plain text, no quotes and nothing else."#;

/// `TopicOracle` over a chat model.
pub struct LlmTopicOracle {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl LlmTopicOracle {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: DEFAULT_NODE_PROMPT.to_string(),
        }
    }

    /// Replaces the default system prompt (e.g. loaded from a prompt file).
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn user_prompt(topic: &str, ctx: &OracleContext) -> String {
        let mut prompt = format!("Create the structured output for the topic \"{topic}\".");
        if !ctx.root.is_empty() && ctx.root != topic {
            prompt.push_str(&format!("\nThe course starts from \"{}\".", ctx.root));
        }
        if !ctx.path.is_empty() {
            prompt.push_str(&format!(
                "\nCurrent learning path: {} -> {topic}. Do not list any of these in related_harder_topics.",
                ctx.path.join(" -> ")
            ));
        }
        prompt
    }
}

/// Trims whitespace and a leading `+ ` bullet the model sometimes adds.
fn clean_text(s: &str) -> String {
    s.trim().trim_start_matches(['+', ' ']).to_string()
}

fn clean_question(q: QuizQuestion) -> QuizQuestion {
    q.map_text(clean_text)
}

#[async_trait]
impl TopicOracle for LlmTopicOracle {
    async fn expand_topic(&self, topic: &str, ctx: &OracleContext) -> Result<NodeResult, OracleError> {
        let messages = [
            Message::system(self.system_prompt.as_str()),
            Message::user(Self::user_prompt(topic, ctx)),
        ];
        let response = self.llm.invoke(&messages).await?;
        debug!(topic, len = response.content.len(), "oracle reply received");
        let mut node = parse_node_output(&response.content)?;
        node.quiz_questions = node.quiz_questions.into_iter().map(clean_question).collect();
        Ok(node)
    }
}

/// Asks the model for the most foundational starting topic of a broad subject.
pub async fn starting_topic(llm: &dyn LlmClient, subject: &str) -> Result<Topic, SkillTreeError> {
    let messages = [
        Message::system(STARTING_TOPIC_PROMPT),
        Message::user(format!("Course overall topic: \"{subject}\"")),
    ];
    let response = llm.invoke(&messages).await?;
    let topic = response
        .content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`' || c == '*')
        .trim()
        .to_string();
    if topic.is_empty() {
        return Err(SkillTreeError::NoStartingTopic(subject.to_string()));
    }
    debug!(subject, topic = %topic, "starting topic chosen");
    Ok(topic)
}
