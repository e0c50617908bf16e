//! Actions that turn one idea into another.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An edge label in the idea tree.
///
/// Serialized with the labels the application layer already uses
/// (`review_and_refine`, `retrieve_and_refine`, `refresh_idea`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Rewrite the idea using the reviewer's feedback.
    #[serde(rename = "review_and_refine")]
    RefineWithFeedback,

    /// Rewrite the idea using retrieved literature.
    #[serde(rename = "retrieve_and_refine")]
    RefineWithRetrieval,

    /// Start over from the research goal. Children created by this action
    /// hang off the tree root, not the node that triggered them.
    #[serde(rename = "refresh_idea")]
    RestartFresh,
}

impl Action {
    /// Every action, in the order EXPAND tries them.
    pub const ALL: [Action; 3] = [
        Action::RefineWithFeedback,
        Action::RefineWithRetrieval,
        Action::RestartFresh,
    ];

    /// Wire label for this action.
    pub fn label(self) -> &'static str {
        match self {
            Action::RefineWithFeedback => "review_and_refine",
            Action::RefineWithRetrieval => "retrieve_and_refine",
            Action::RestartFresh => "refresh_idea",
        }
    }

    /// Whether children produced by this action attach to the tree root.
    #[inline]
    pub fn attaches_to_root(self) -> bool {
        matches!(self, Action::RestartFresh)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
