//! Mutator trait for producing new ideas.
//!
//! A mutator applies an [`Action`] to an idea and returns the rewritten idea.
//! In production this wraps a text-generation call; the search treats it as an
//! opaque, possibly failing function.

use thiserror::Error;

use crate::action::Action;
use crate::node::IdeaState;

/// Errors that can occur while applying an action.
#[derive(Debug, Error)]
pub enum MutatorError {
    #[error("Generation failed for {action}: {reason}")]
    GenerationFailed { action: Action, reason: String },

    #[error("Action {0} is not supported")]
    Unsupported(Action),

    #[error("No retrieved material available")]
    NothingRetrieved,
}

/// Trait for idea mutators.
///
/// The returned state only needs its content (and whatever knowledge or
/// feedback the mutator attached). The search fills in depth, research goal
/// and, when missing, subject before the state enters the tree. Review
/// fields are cleared, so returning a modified clone of the input is fine:
/// every new idea is reviewed on its own.
pub trait Mutator: Send + Sync {
    fn apply(&self, state: &IdeaState, action: Action) -> Result<IdeaState, MutatorError>;
}

impl<M: Mutator + ?Sized> Mutator for std::sync::Arc<M> {
    fn apply(&self, state: &IdeaState, action: Action) -> Result<IdeaState, MutatorError> {
        (**self).apply(state, action)
    }
}

impl<M: Mutator + ?Sized> Mutator for Box<M> {
    fn apply(&self, state: &IdeaState, action: Action) -> Result<IdeaState, MutatorError> {
        (**self).apply(state, action)
    }
}
