//! Monte Carlo Tree Search over research ideas.
//!
//! Starting from a research goal, the search grows a tree of ideas. Each edge
//! is an [`Action`] (refine using reviewer feedback, refine using retrieved
//! literature, or restart from the goal) and each node is reviewed by a
//! [`Scorer`] whose 1-10 average becomes the reward.
//!
//! # Overview
//!
//! Each iteration consists of four phases:
//!
//! 1. **Selection**: Descend from the root, taking any unvisited child first
//!    and otherwise following UCT, until a leaf or the depth limit
//! 2. **Evaluation**: Reward is the cached review score / 10; unreviewed nodes
//!    are reviewed on the spot, with a depth-decay fallback when that fails
//! 3. **Expansion**: Apply every action not yet represented through the
//!    [`Mutator`] and review each new child immediately
//! 4. **Backpropagation**: Update visit counts and running means along the
//!    path to the root, discounting the reward at each hop
//!
//! # Usage
//!
//! ```rust,ignore
//! use idea_mcts::{SearchConfig, Session};
//!
//! let session = Session::start("Cheaper protein assays", SearchConfig::default(), mutator, scorer);
//!
//! match session.run_iterations(3, 5, 0.9)? {
//!     RunOutcome::Completed(result) => println!("Now at node {}", result.current),
//!     RunOutcome::Busy => println!("Another search is running"),
//! }
//!
//! let best = session.navigate_to_best();
//! session.with_tree(|tree| tree.save_to_file("data/tree.json"))?;
//! ```
//!
//! # Configuration
//!
//! The [`SearchConfig`] struct controls search behavior:
//!
//! - `iterations`: Cycles per request (default: 1, capped by `max_iterations_per_request`)
//! - `exploration_constant`: UCT constant (default: sqrt(2))
//! - `max_depth`: Depth at which selection stops and expansion is skipped (default: 5)
//! - `discount_factor`: Per-hop reward attenuation in (0, 1] (default: 0.9)
//! - `gates`: Minimum per-aspect scores for best-node selection

pub mod action;
pub mod config;
pub mod evaluator;
pub mod mutator;
pub mod node;
pub mod search;
pub mod selector;
pub mod session;
pub mod snapshot;
pub mod tree;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export main types
pub use action::Action;
pub use config::SearchConfig;
pub use evaluator::{Review, Scorer, ScorerError};
pub use mutator::{Mutator, MutatorError};
pub use node::{IdeaState, NodeId, TreeNode};
pub use search::{
    fallback_reward, run_iterations, IdeaSearch, IterationOutcome, SearchError, SearchResult,
    SearchStats,
};
pub use selector::ViabilityGates;
pub use session::{RunOutcome, Session};
pub use snapshot::{NodeSnapshot, SnapshotError};
pub use tree::{IdeaTree, TreeStats};
