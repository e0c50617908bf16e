//! JSON snapshots of an idea tree.
//!
//! The snapshot nests each node's children inside it, which is the shape the
//! application layer stores and renders. Loading rebuilds the arena and checks
//! that ids, parent links and depths are consistent before handing the tree
//! back.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::action::Action;
use crate::node::{IdeaState, NodeId, TreeNode};
use crate::tree::IdeaTree;

/// Errors that can occur while reading or writing snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate node id {0}")]
    DuplicateId(NodeId),

    #[error("Node id {id} out of range for a tree of {len} nodes")]
    IdOutOfRange { id: NodeId, len: usize },

    #[error("Node {id} records parent {recorded:?} but is nested under {actual:?}")]
    ParentMismatch {
        id: NodeId,
        recorded: Option<NodeId>,
        actual: Option<NodeId>,
    },

    #[error("Non-root node {0} has no action")]
    MissingAction(NodeId),

    #[error("Node {id} records depth {recorded} but is nested at depth {expected}")]
    DepthMismatch {
        id: NodeId,
        recorded: u32,
        expected: u32,
    },
}

/// One node of a serialized tree, with its subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub action: Option<Action>,
    pub parent_id: Option<NodeId>,
    pub state: IdeaState,
    pub visits: u32,
    pub value: f64,
    #[serde(default)]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

impl IdeaTree {
    /// Serialize the whole tree, starting at the root.
    pub fn to_snapshot(&self) -> NodeSnapshot {
        self.snapshot_node(self.root())
    }

    fn snapshot_node(&self, id: NodeId) -> NodeSnapshot {
        let node = self.get(id);
        NodeSnapshot {
            id: node.id,
            action: node.action,
            parent_id: node.parent.is_some().then_some(node.parent),
            state: node.state.clone(),
            visits: node.visit_count,
            value: node.value,
            children: node
                .children
                .iter()
                .map(|(_, child)| self.snapshot_node(*child))
                .collect(),
        }
    }

    /// Rebuild a tree from a snapshot, reproducing ids and links exactly.
    pub fn from_snapshot(snapshot: &NodeSnapshot) -> Result<Self, SnapshotError> {
        let len = snapshot.node_count();
        let mut slots: Vec<Option<TreeNode>> = vec![None; len];
        let mut stack: Vec<(&NodeSnapshot, Option<NodeId>, u32)> = vec![(snapshot, None, 0)];

        while let Some((snap, actual_parent, depth)) = stack.pop() {
            let index = snap.id.index();
            if index >= len {
                return Err(SnapshotError::IdOutOfRange { id: snap.id, len });
            }
            if slots[index].is_some() {
                return Err(SnapshotError::DuplicateId(snap.id));
            }
            if snap.parent_id != actual_parent {
                return Err(SnapshotError::ParentMismatch {
                    id: snap.id,
                    recorded: snap.parent_id,
                    actual: actual_parent,
                });
            }
            if snap.state.depth != depth {
                return Err(SnapshotError::DepthMismatch {
                    id: snap.id,
                    recorded: snap.state.depth,
                    expected: depth,
                });
            }

            let mut children = Vec::with_capacity(snap.children.len());
            for child in &snap.children {
                let action = child.action.ok_or(SnapshotError::MissingAction(child.id))?;
                children.push((action, child.id));
                stack.push((child, Some(snap.id), depth + 1));
            }

            slots[index] = Some(TreeNode {
                id: snap.id,
                parent: actual_parent.unwrap_or(NodeId::NONE),
                action: if actual_parent.is_some() {
                    snap.action
                } else {
                    None
                },
                state: snap.state.clone(),
                visit_count: snap.visits,
                value: snap.value,
                children,
            });
        }

        // `len` unique ids below `len` fill every slot
        let nodes: Vec<TreeNode> = slots.into_iter().flatten().collect();
        debug!(nodes = nodes.len(), "Snapshot restored");
        Ok(IdeaTree::from_parts(nodes, snapshot.id))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: NodeSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(&snapshot)
    }

    /// Write the tree as pretty JSON, creating parent directories as needed.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let io_err = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_json()?).map_err(io_err)?;

        info!(path = %path.display(), nodes = self.len(), "Saved idea tree");
        Ok(())
    }

    /// Read a tree written by [`save_to_file`](Self::save_to_file).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tree = Self::from_json(&json)?;
        info!(path = %path.display(), nodes = tree.len(), "Loaded idea tree");
        Ok(tree)
    }
}
