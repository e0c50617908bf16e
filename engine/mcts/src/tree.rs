//! Idea tree structure with arena allocation.
//!
//! Nodes live in a contiguous Vec and reference each other by NodeId. Parents
//! own their children through the id list; the parent id on each child is a
//! back-reference for walking toward the root. The tree only grows.

use tracing::trace;

use crate::action::Action;
use crate::node::{IdeaState, NodeId, TreeNode};

/// Idea tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct IdeaTree {
    /// Arena storing all nodes
    nodes: Vec<TreeNode>,

    /// Root node index (always 0 for trees built with `new`)
    root: NodeId,
}

impl IdeaTree {
    /// Create a new tree whose root holds the research goal.
    pub fn new(research_goal: impl Into<String>) -> Self {
        Self::with_root_state(IdeaState::root(research_goal))
    }

    /// Create a new tree from an explicit root state. Depth is forced to 0.
    pub fn with_root_state(mut state: IdeaState) -> Self {
        state.depth = 0;
        let root = NodeId(0);
        Self {
            nodes: vec![TreeNode::new_root(root, state)],
            root,
        }
    }

    /// Rebuild a tree from nodes whose ids already equal their arena index.
    pub(crate) fn from_parts(nodes: Vec<TreeNode>, root: NodeId) -> Self {
        debug_assert!(nodes.iter().enumerate().all(|(i, n)| n.id.index() == i));
        Self { nodes, root }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    ///
    /// Panics on ids that did not come from this tree; use [`find`](Self::find)
    /// for ids supplied from outside.
    #[inline]
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }

    /// Look up a node by an id that may not exist.
    #[inline]
    pub fn find(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (never true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    pub fn add_child(&mut self, parent_id: NodeId, state: IdeaState, action: Action) -> NodeId {
        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes
            .push(TreeNode::new_child(child_id, parent_id, action, state));
        self.get_mut(parent_id).children.push((action, child_id));
        child_id
    }

    /// Select the child of `node_id` with the highest UCT score.
    /// Ties keep the earliest child.
    pub fn select_child(&self, node_id: NodeId, exploration_constant: f64) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.visit_count;

        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child_id) in &node.children {
            let score = self
                .get(child_id)
                .uct_score(parent_visits, exploration_constant);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Backpropagate a reward from a leaf to the root.
    ///
    /// Each node on the way is updated with the current reward, which is then
    /// multiplied by `discount_factor` before moving to the parent.
    /// Returns the number of nodes updated (leaf depth + 1).
    pub fn backpropagate(&mut self, leaf_id: NodeId, reward: f64, discount_factor: f64) -> usize {
        let mut current_id = leaf_id;
        let mut current_reward = reward;
        let mut touched = 0;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.update(current_reward);
            touched += 1;

            trace!(
                node = current_id.0,
                reward = current_reward,
                visits = node.visit_count,
                value = node.value,
                "Backpropagated"
            );

            current_reward *= discount_factor;
            current_id = node.parent;
        }

        touched
    }

    /// Ids from the root down to `node_id`, inclusive.
    pub fn trajectory(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = node_id;
        while current.is_some() {
            path.push(current);
            current = self.get(current).parent;
        }
        path.reverse();
        path
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            reviewed_nodes: self.nodes.iter().filter(|n| n.state.is_reviewed()).count(),
            root_visits: root.visit_count,
            root_value: root.value,
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        if node.children.is_empty() {
            return current_depth;
        }

        node.children
            .iter()
            .map(|(_, id)| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an idea tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub reviewed_nodes: usize,
    pub root_visits: u32,
    pub root_value: f64,
    pub max_depth: u32,
}
