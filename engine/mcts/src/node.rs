//! Idea tree node representation.
//!
//! Each node holds the idea reached by applying an action to its parent's idea,
//! along with the visit statistics used for UCT selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::action::Action;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of an idea at one position in the tree.
///
/// Equality and hashing look at `content` only, so two states with the same
/// text compare equal even at different depths or under different goals.
/// That mirrors how ideas have always been deduplicated; it is probably too
/// coarse and should be revisited before anything keys a map on `IdeaState`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdeaState {
    /// Set once at the root and copied to every descendant.
    pub research_goal: String,

    /// The idea text.
    pub content: String,

    pub depth: u32,

    /// Timestamp (unix millis) -> feedback text. Append-only.
    #[serde(default)]
    pub feedback_log: BTreeMap<u64, String>,

    /// Opaque retrieval records attached by the mutator.
    #[serde(default)]
    pub retrieved_knowledge: Vec<serde_json::Value>,

    /// Aspect name -> score on the reviewer's 1-10 scale.
    #[serde(default)]
    pub review_scores: BTreeMap<String, f64>,

    /// Aspect name -> reviewer commentary.
    #[serde(default)]
    pub review_feedback: BTreeMap<String, String>,

    /// Unset until a review succeeds. Distinct from a score of 0.
    #[serde(default)]
    pub average_score: Option<f64>,

    #[serde(default)]
    pub subject: Option<String>,
}

impl IdeaState {
    /// Root state for a new session. The goal doubles as the initial content.
    pub fn root(research_goal: impl Into<String>) -> Self {
        let research_goal = research_goal.into();
        Self {
            content: research_goal.clone(),
            research_goal,
            ..Self::default()
        }
    }

    /// A state holding `content`, for mutators building their output.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Whether a usable review is attached (score set and above zero).
    #[inline]
    pub fn is_reviewed(&self) -> bool {
        matches!(self.average_score, Some(score) if score > 0.0)
    }

    /// Append feedback at `timestamp`, moving to the next free key if taken.
    /// Past `u64::MAX` the search wraps to 0. Returns the key actually used.
    pub fn append_feedback_at(&mut self, timestamp: u64, text: impl Into<String>) -> u64 {
        let mut key = timestamp;
        while self.feedback_log.contains_key(&key) {
            key = key.wrapping_add(1);
        }
        self.feedback_log.insert(key, text.into());
        key
    }

    /// Append feedback stamped with the current wall clock.
    pub fn append_feedback(&mut self, text: impl Into<String>) -> u64 {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.append_feedback_at(now, text)
    }

    /// Most recent feedback entry, if any.
    pub fn latest_feedback(&self) -> Option<&str> {
        self.feedback_log.values().next_back().map(String::as_str)
    }
}

impl PartialEq for IdeaState {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl Eq for IdeaState {}

impl Hash for IdeaState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content.hash(state);
    }
}

/// A node in the idea tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,

    /// Parent node index (NONE for root). Used for traversal only.
    pub parent: NodeId,

    /// Action that produced this node (None only for the root)
    pub action: Option<Action>,

    pub state: IdeaState,

    /// Number of times this node has been visited
    pub visit_count: u32,

    /// Running mean of the rewards backpropagated through this node.
    /// Only meaningful once `visit_count > 0`.
    pub value: f64,

    /// Children in creation order: (action, NodeId) pairs.
    pub children: Vec<(Action, NodeId)>,
}

impl TreeNode {
    /// Create a new root node.
    pub fn new_root(id: NodeId, state: IdeaState) -> Self {
        Self {
            id,
            parent: NodeId::NONE,
            action: None,
            state,
            visit_count: 0,
            value: 0.0,
            children: Vec::new(),
        }
    }

    /// Create a new child node.
    pub fn new_child(id: NodeId, parent: NodeId, action: Action, state: IdeaState) -> Self {
        Self {
            id,
            parent,
            action: Some(action),
            state,
            visit_count: 0,
            value: 0.0,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Fold one reward into the running mean: `V += (r - V) / N`.
    #[inline]
    pub fn update(&mut self, reward: f64) {
        self.visit_count += 1;
        self.value += (reward - self.value) / self.visit_count as f64;
    }

    /// UCT score used when descending from a parent with `parent_visits`.
    ///
    /// `V + c * sqrt(ln(max(N_parent, 1)) / N)`; unvisited nodes score +inf.
    #[inline]
    pub fn uct_score(&self, parent_visits: u32, exploration_constant: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }
        let ln_parent = (parent_visits.max(1) as f64).ln();
        self.value + exploration_constant * (ln_parent / self.visit_count as f64).sqrt()
    }

    /// Check if this node has been expanded (has children).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether a committed child already carries `action`.
    pub fn has_child_for(&self, action: Action) -> bool {
        self.children.iter().any(|(a, _)| *a == action)
    }
}
