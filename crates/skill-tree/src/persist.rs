//! JSON persistence for graphs and trees.
//!
//! Documents are written to a sibling `*.tmp` file and renamed into place, so a
//! failed write never leaves a document that looks complete.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::linearize::SkillGraph;
use crate::model::NodeResult;
use crate::render::render_typescript;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> PersistError + '_ {
    move |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `value` as pretty JSON to `path`, atomically replacing any old file.
pub fn write_json_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    let body = serde_json::to_string_pretty(value)?;
    write_text_document(path, &body)
}

/// Writes `body` to `path` through a sibling temp file and a rename.
pub fn write_text_document(path: &Path, body: &str) -> Result<(), PersistError> {
    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, body) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(&tmp)(e));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(path)(e));
    }
    Ok(())
}

fn read_json_document<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let body = fs::read_to_string(path).map_err(io_err(path))?;
    Ok(serde_json::from_str(&body)?)
}

/// Writes the `{nodes, edges}` document.
pub fn write_graph(path: &Path, graph: &SkillGraph) -> Result<(), PersistError> {
    write_json_document(path, graph)?;
    info!(path = %path.display(), nodes = graph.nodes.len(), edges = graph.edges.len(), "graph written");
    Ok(())
}

/// Writes the nested tree.
pub fn write_tree(path: &Path, tree: &NodeResult) -> Result<(), PersistError> {
    write_json_document(path, tree)?;
    info!(path = %path.display(), nodes = tree.subtree_len(), "tree written");
    Ok(())
}

/// Writes the `initialNodes` / `initialEdges` TypeScript module for `graph`.
pub fn write_typescript(path: &Path, graph: &SkillGraph) -> Result<(), PersistError> {
    write_text_document(path, &render_typescript(graph))?;
    info!(path = %path.display(), nodes = graph.nodes.len(), "typescript written");
    Ok(())
}

/// Reads a nested (or flat, children-less) tree document.
pub fn read_tree(path: &Path) -> Result<NodeResult, PersistError> {
    read_json_document(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linearize::linearize;

    #[test]
    fn graph_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("react_flow_skill_tree.json");
        let root = NodeResult::new("Big O Notation").with_related(["Time Complexity Analysis"]);
        let graph = linearize(&root, 3);

        write_graph(&path, &graph).unwrap();

        let body = fs::read_to_string(&path).unwrap();
        let back: SkillGraph = serde_json::from_str(&body).unwrap();
        assert_eq!(back, graph);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn tree_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        let tree = NodeResult::new("A").with_children(vec![NodeResult::new("B")]);
        write_tree(&path, &tree).unwrap();
        assert_eq!(read_tree(&path).unwrap(), tree);
    }

    #[test]
    fn overwrite_replaces_old_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.json");
        fs::write(&path, "stale").unwrap();
        write_graph(&path, &SkillGraph::default()).unwrap();
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.contains("\"nodes\""));
    }

    #[test]
    fn missing_directory_fails_without_leaving_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("g.json");
        let err = write_graph(&path, &SkillGraph::default()).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
        assert!(!path.exists());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn typescript_is_written_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("initial-elements.ts");
        let graph = linearize(&NodeResult::new("Arrays").with_related(["Two Pointers"]), 3);
        write_typescript(&path, &graph).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), render_typescript(&graph));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn failed_typescript_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("initial-elements.ts");
        let err = write_typescript(&path, &SkillGraph::default()).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
        assert!(!path.exists());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn reading_garbage_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(read_tree(&path), Err(PersistError::Serialization(_))));
    }
}
