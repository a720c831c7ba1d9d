//! Skill-tree: turns a topic into a bounded-depth tree of learnable topics and
//! flattens it into a React Flow style `{nodes, edges}` graph.
//!
//! Data flows one way:
//! `TopicOracle` → [`TreeExpander`] → nested [`NodeResult`] tree →
//! [`GraphLinearizer`] → [`SkillGraph`] → JSON document / UI.
//!
//! The oracle is an injected capability. [`LlmTopicOracle`] backs it with a
//! chat-completions model; [`MockOracle`] scripts it for tests and demos.

pub mod error;
pub mod expand;
pub mod linearize;
pub mod llm;
pub mod llm_oracle;
pub mod model;
pub mod oracle;
pub mod persist;
pub mod render;

pub use error::{SkillTreeError, SkillTreeResult};
pub use expand::{BranchLocalDedup, ExpandError, ExpansionStats, OnOracleFailure, TreeExpander};
pub use linearize::{
    linearize, GraphEdge, GraphLinearizer, GraphNode, GraphNodeData, NodeKind, Position,
    RunGlobalDedup, SkillGraph,
};
pub use llm::{
    ChatOpenAI, LlmClient, LlmError, LlmResponse, Message, MockLlm, OpenAiConfig, DEFAULT_API_BASE,
    DEFAULT_MODEL,
};
pub use llm_oracle::{starting_topic, LlmTopicOracle, DEFAULT_NODE_PROMPT};
pub use model::{NodeResult, QuizQuestion, Resource, TerminationReason, Topic};
pub use oracle::{parse_node_output, MockOracle, OracleContext, OracleError, TopicOracle};
pub use persist::{
    read_tree, write_graph, write_json_document, write_text_document, write_tree, write_typescript,
    PersistError,
};
pub use render::{format_tree, render_typescript};
