//! Integration tests for TreeExpander: depth bounds, per-branch cycle
//! cutting, child order and oracle failure handling. Uses MockOracle.

use async_trait::async_trait;
use skill_tree::{
    ExpandError, MockOracle, NodeResult, OnOracleFailure, OracleContext, OracleError,
    TerminationReason, TopicOracle, TreeExpander,
};

fn topics(nodes: &[NodeResult]) -> Vec<&str> {
    nodes.iter().map(|n| n.topic.as_str()).collect()
}

// --- depth ---

#[tokio::test]
async fn zero_depth_returns_stub_without_calling_oracle() {
    let oracle = MockOracle::new().with("Big O Notation", ["Time Complexity Analysis"]);
    let expander = TreeExpander::new(&oracle);

    let tree = expander.expand("Big O Notation", 0).await.unwrap();

    assert_eq!(tree.topic, "Big O Notation");
    assert!(tree.children.is_empty());
    assert!(tree.resources.is_empty());
    assert!(tree.related_harder_topics.is_empty());
    assert_eq!(tree.termination, Some(TerminationReason::DepthCapped));
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn depth_one_expands_root_only() {
    let oracle = MockOracle::new().with("Root", ["A", "B", "C"]);
    let tree = TreeExpander::new(&oracle).expand("Root", 1).await.unwrap();

    assert_eq!(tree.related_harder_topics, ["A", "B", "C"]);
    assert!(tree.children.is_empty());
    assert_eq!(oracle.calls(), ["Root"]);
}

#[tokio::test]
async fn depth_bounds_tree_height() {
    let oracle = MockOracle::new()
        .with("L0", ["L1"])
        .with("L1", ["L2"])
        .with("L2", ["L3"])
        .with("L3", ["L4"]);
    let tree = TreeExpander::new(&oracle).expand("L0", 3).await.unwrap();

    assert_eq!(tree.children[0].children[0].topic, "L2");
    assert!(tree.children[0].children[0].children.is_empty());
    assert_eq!(oracle.calls(), ["L0", "L1", "L2"]);
}

// --- cycles and duplicates ---

#[tokio::test]
async fn self_reference_is_skipped() {
    let oracle = MockOracle::new().with("A", ["A", "B"]);
    let tree = TreeExpander::new(&oracle).expand("A", 5).await.unwrap();

    assert_eq!(topics(&tree.children), ["B"]);
    assert_eq!(oracle.calls_for("A"), 1);
}

#[tokio::test]
async fn topic_identity_is_exact_string_equality() {
    let oracle = MockOracle::new().with("A", ["A ", "a", " Recursion "]);
    let tree = TreeExpander::new(&oracle).expand("A", 2).await.unwrap();

    assert_eq!(topics(&tree.children), ["A ", "a", " Recursion "]);
    assert_eq!(oracle.calls(), ["A", "A ", "a", " Recursion "]);
}

#[tokio::test]
async fn cycle_through_descendant_terminates() {
    let oracle = MockOracle::new().with("A", ["B"]).with("B", ["C"]).with("C", ["A", "B"]);
    let tree = TreeExpander::new(&oracle).expand("A", 10).await.unwrap();

    let c = &tree.children[0].children[0];
    assert_eq!(c.topic, "C");
    assert!(c.children.is_empty());
    assert_eq!(oracle.call_count(), 3);
}

#[tokio::test]
async fn same_topic_expands_independently_in_sibling_branches() {
    let oracle = MockOracle::new()
        .with("DSA", ["Trees", "Graphs"])
        .with("Trees", ["Recursion"])
        .with("Graphs", ["Recursion"])
        .with("Recursion", ["Dynamic Programming"]);
    let tree = TreeExpander::new(&oracle).expand("DSA", 4).await.unwrap();

    let left = &tree.children[0].children[0];
    let right = &tree.children[1].children[0];
    assert_eq!(left.topic, "Recursion");
    assert_eq!(right.topic, "Recursion");
    assert_ne!(left.id, right.id);
    assert_eq!(oracle.calls_for("Recursion"), 2);
}

#[tokio::test]
async fn oracle_sees_branch_path_only() {
    let oracle = MockOracle::new()
        .with("Root", ["A", "B"])
        .with("A", ["A1"]);
    TreeExpander::new(&oracle).expand("Root", 3).await.unwrap();

    let calls = oracle.calls();
    let contexts = oracle.contexts();
    let b = calls.iter().position(|t| t == "B").unwrap();
    let a1 = calls.iter().position(|t| t == "A1").unwrap();
    assert_eq!(contexts[a1].path, ["Root", "A"]);
    assert_eq!(contexts[a1].depth, 2);
    assert_eq!(contexts[b].path, ["Root"]);
    assert!(contexts.iter().all(|c| c.root == "Root"));
}

// --- order and shape ---

#[tokio::test]
async fn children_follow_oracle_order_depth_first() {
    let oracle = MockOracle::new()
        .with("Root", ["Z", "A", "M"])
        .with("Z", ["Z1"]);
    let tree = TreeExpander::new(&oracle).expand("Root", 3).await.unwrap();

    assert_eq!(topics(&tree.children), ["Z", "A", "M"]);
    assert_eq!(oracle.calls(), ["Root", "Z", "Z1", "A", "M"]);
}

#[tokio::test]
async fn leaves_are_tagged() {
    let oracle = MockOracle::new().with("Root", ["Sliding Window"]);
    let tree = TreeExpander::new(&oracle).expand("Root", 3).await.unwrap();

    assert_eq!(tree.termination, None);
    assert_eq!(tree.children[0].termination, Some(TerminationReason::Leaf));
}

/// Answers every topic with a differently-cased label and one related topic.
struct RelabelingOracle;

#[async_trait]
impl TopicOracle for RelabelingOracle {
    async fn expand_topic(&self, topic: &str, ctx: &OracleContext) -> Result<NodeResult, OracleError> {
        let related = if ctx.depth == 0 { vec!["Arrays"] } else { vec![] };
        Ok(NodeResult::new(topic.to_uppercase()).with_related(related))
    }
}

#[tokio::test]
async fn requested_topic_overrides_oracle_label() {
    let tree = TreeExpander::new(RelabelingOracle)
        .expand("Big O Notation", 3)
        .await
        .unwrap();
    assert_eq!(tree.topic, "Big O Notation");
    assert_eq!(tree.children[0].topic, "Arrays");
}

#[tokio::test]
async fn max_children_limits_fan_out_after_dedup() {
    let oracle = MockOracle::new().with("Root", ["Root", "A", "B", "C", "D"]);
    let tree = TreeExpander::new(&oracle)
        .with_max_children(Some(3))
        .expand("Root", 2)
        .await
        .unwrap();

    assert_eq!(topics(&tree.children), ["A", "B", "C"]);
    assert_eq!(tree.related_harder_topics.len(), 5);
}

#[tokio::test]
async fn stats_count_calls_and_leaves() {
    let oracle = MockOracle::new().with("Root", ["A", "B"]);
    let (tree, stats) = TreeExpander::new(&oracle)
        .expand_with_stats("Root", 3)
        .await
        .unwrap();

    assert_eq!(tree.subtree_len(), 3);
    assert_eq!(stats.oracle_calls, 3);
    assert_eq!(stats.nodes, 3);
    assert_eq!(stats.leaves, 2);
}

// --- failures ---

#[tokio::test]
async fn oracle_failure_aborts_by_default() {
    let oracle = MockOracle::new().with("Root", ["A", "B"]).fail_on("A");
    let err = TreeExpander::new(&oracle).expand("Root", 3).await.unwrap_err();

    let ExpandError::Oracle { topic, source } = err;
    assert_eq!(topic, "A");
    assert!(matches!(source, OracleError::Failed(_)));
    assert_eq!(oracle.calls(), ["Root", "A"]);
}

#[tokio::test]
async fn stub_policy_substitutes_empty_node_and_continues() {
    let oracle = MockOracle::new().with("Root", ["A", "B"]).fail_on("A");
    let (tree, stats) = TreeExpander::new(&oracle)
        .with_failure_policy(OnOracleFailure::Stub)
        .expand_with_stats("Root", 3)
        .await
        .unwrap();

    let failed = &tree.children[0];
    assert_eq!(failed.topic, "A");
    assert_eq!(failed.termination, Some(TerminationReason::OracleFailed));
    assert!(failed.related_harder_topics.is_empty());
    assert_eq!(tree.children[1].topic, "B");
    assert_eq!(stats.failures, 1);
}

#[tokio::test]
async fn root_failure_with_stub_policy_yields_single_stub() {
    let oracle = MockOracle::new().fail_on("Root");
    let tree = TreeExpander::new(&oracle)
        .with_failure_policy(OnOracleFailure::Stub)
        .expand("Root", 3)
        .await
        .unwrap();
    assert!(tree.is_leaf());
    assert_eq!(tree.termination, Some(TerminationReason::OracleFailed));
}
