//! Text renderings: an indented outline for the terminal and the legacy
//! React Flow TypeScript module.

use std::fmt::Write;

use crate::linearize::SkillGraph;
use crate::model::{NodeResult, TerminationReason};

fn termination_label(reason: TerminationReason) -> &'static str {
    match reason {
        TerminationReason::Leaf => "leaf",
        TerminationReason::DepthCapped => "depth cap",
        TerminationReason::CycleDetected => "cycle",
        TerminationReason::OracleFailed => "oracle failed",
    }
}

fn tree_lines(node: &NodeResult, indent: usize, lines: &mut Vec<String>) {
    let prefix = "  ".repeat(indent);
    let mut line = format!(
        "{}- {} ({} resources, {} questions)",
        prefix,
        node.topic,
        node.resources.len(),
        node.quiz_questions.len()
    );
    if let Some(reason) = node.termination {
        let _ = write!(line, " [{}]", termination_label(reason));
    }
    lines.push(line);
    for child in &node.children {
        tree_lines(child, indent + 1, lines);
    }
}

/// Formats the tree as an indented outline, one topic per line.
pub fn format_tree(root: &NodeResult) -> String {
    let mut lines = Vec::new();
    tree_lines(root, 0, &mut lines);
    lines.join("\n")
}

/// JSON-encodes `value` with the given indent width, for embedding in TS.
fn json_indented<T: serde::Serialize>(value: &T, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string());
    body.lines().collect::<Vec<_>>().join(&format!("\n{pad}"))
}

fn ts_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Renders `initialNodes` / `initialEdges` exports for a React Flow front end.
pub fn render_typescript(graph: &SkillGraph) -> String {
    let mut out = String::from("const position = { x: 0, y: 0 };\n\n");
    out.push_str("export const initialNodes: Node[] = [\n");
    for node in &graph.nodes {
        let kind = serde_json::to_value(node.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let data = &node.data;
        let _ = writeln!(out, "  {{");
        let _ = writeln!(out, "    id: {},", ts_string(&node.id));
        let _ = writeln!(out, "    type: {},", ts_string(&kind));
        let _ = writeln!(out, "    data: {{");
        let _ = writeln!(out, "      label: {},", ts_string(&data.label));
        let _ = writeln!(out, "      topic: {},", ts_string(&data.topic));
        let _ = writeln!(out, "      resources: {},", json_indented(&data.resources, 6));
        let _ = writeln!(out, "      quiz_questions: {},", json_indented(&data.quiz_questions, 6));
        let _ = writeln!(
            out,
            "      related_harder_topics: {},",
            serde_json::to_string(&data.related_harder_topics).unwrap_or_else(|_| "[]".to_string())
        );
        let _ = writeln!(out, "      uuid: {},", ts_string(&data.uuid));
        if data.is_placeholder {
            let _ = writeln!(out, "      is_placeholder: true,");
        }
        let _ = writeln!(out, "    }},");
        let _ = writeln!(out, "    position,");
        let _ = writeln!(out, "  }},");
    }
    out.push_str("];\n\n");
    out.push_str("export const initialEdges: Edge[] = [\n");
    for edge in &graph.edges {
        let _ = writeln!(
            out,
            "  {{ id: {}, source: {}, target: {} }},",
            ts_string(&format!("e{}-{}", edge.source, edge.target)),
            ts_string(&edge.source),
            ts_string(&edge.target)
        );
    }
    out.push_str("];\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linearize::linearize;

    #[test]
    fn outline_indents_children_and_tags_stubs() {
        let tree = NodeResult::new("Big O Notation").with_children(vec![NodeResult::stub(
            "Time Complexity Analysis",
            TerminationReason::DepthCapped,
        )]);
        let text = format_tree(&tree);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "- Big O Notation (0 resources, 0 questions)");
        assert_eq!(
            lines[1],
            "  - Time Complexity Analysis (0 resources, 0 questions) [depth cap]"
        );
    }

    #[test]
    fn typescript_lists_nodes_and_edges() {
        let root = NodeResult::new("Big O Notation").with_related(["Time \"Complexity\""]);
        let ts = render_typescript(&linearize(&root, 3));
        assert!(ts.starts_with("const position = { x: 0, y: 0 };"));
        assert!(ts.contains("type: \"root\","));
        assert!(ts.contains("label: \"Time \\\"Complexity\\\" (placeholder)\","));
        assert!(ts.contains("is_placeholder: true,"));
        assert!(ts.contains("source: \"1\", target: \"2\""));
    }
}
