//! Idea tree search implementation.
//!
//! Each iteration runs four phases against the tree:
//! 1. Selection: descend from the root, visiting unvisited children first and
//!    otherwise following UCT, until a leaf or the depth limit
//! 2. Evaluation: turn the selected idea's review score into a reward,
//!    asking the scorer when no review is cached
//! 3. Expansion: apply every action not yet represented and review each new
//!    child immediately
//! 4. Backpropagation: fold the discounted reward into every node on the
//!    path back to the root

use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::action::Action;
use crate::config::SearchConfig;
use crate::evaluator::Scorer;
use crate::mutator::Mutator;
use crate::node::{IdeaState, NodeId};
use crate::tree::IdeaTree;

/// Errors that can occur during a search request.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Iteration {iteration} failed: {message}")]
    IterationFailed { iteration: u32, message: String },
}

/// Counters collected over one search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Iterations that ran to completion
    pub iterations: u32,
    pub selections: u32,
    pub expansions: u32,
    pub mutator_failures: u32,
    pub scorer_calls: u32,
    /// Scorer returned an error
    pub scorer_failures: u32,
    /// Scorer returned a review without a usable average or with a
    /// non-finite aspect score
    pub malformed_reviews: u32,
    /// Sum of the two above: rewards taken from [`fallback_reward`]
    pub fallback_rewards: u32,
}

/// Result of a search request.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Node the caller should treat as current after the search
    pub current: NodeId,

    /// Review score of `current`, if it has one
    pub best_score: Option<f64>,

    pub stats: SearchStats,
}

/// What one iteration did.
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    pub selected: NodeId,
    pub reward: f64,
    pub expanded: Vec<NodeId>,
}

/// Reward used when the scorer cannot review a node: `1 / (depth + 1)`.
///
/// Shallower ideas get the benefit of the doubt, so a flaky reviewer nudges
/// the search back toward the root rather than deeper into unreviewed work.
#[inline]
pub fn fallback_reward(depth: u32) -> f64 {
    1.0 / (depth as f64 + 1.0)
}

/// Normalise a 1-10 review score to a reward in [0, 1].
#[inline]
pub fn score_to_reward(average_score: f64) -> f64 {
    (average_score / 10.0).clamp(0.0, 1.0)
}

/// Search state for one request over a borrowed tree.
pub struct IdeaSearch<'a, M: Mutator + ?Sized, S: Scorer + ?Sized> {
    tree: &'a mut IdeaTree,
    mutator: &'a M,
    scorer: &'a S,
    config: SearchConfig,
    stats: SearchStats,
}

impl<'a, M: Mutator + ?Sized, S: Scorer + ?Sized> IdeaSearch<'a, M, S> {
    /// Create a search over `tree`. Fails if the config is unusable.
    pub fn new(
        tree: &'a mut IdeaTree,
        mutator: &'a M,
        scorer: &'a S,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            tree,
            mutator,
            scorer,
            config,
            stats: SearchStats::default(),
        })
    }

    /// Run the configured number of iterations starting from `current`.
    ///
    /// A panic inside a collaborator aborts the request with
    /// [`SearchError::IterationFailed`]; statistics committed by earlier
    /// iterations are kept.
    pub fn run(
        &mut self,
        current: NodeId,
        rng: &mut ChaCha20Rng,
    ) -> Result<SearchResult, SearchError> {
        if self.tree.find(current).is_none() {
            return Err(SearchError::NodeNotFound(current));
        }

        let mut best = current;
        let mut best_score = self.reviewed_score(current);

        for iteration in 0..self.config.iterations {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.iterate(rng)))
                .map_err(|payload| {
                    let message = panic_message(&*payload);
                    warn!(iteration, %message, "Search iteration aborted");
                    SearchError::IterationFailed { iteration, message }
                })?;

            if let Some(score) = self.reviewed_score(outcome.selected) {
                if best_score.map_or(true, |b| score > b) {
                    best = outcome.selected;
                    best_score = Some(score);
                }
            }
        }

        if let Some(child) = self.tree.exploitation_best_child(self.tree.root()) {
            if let Some(score) = self.reviewed_score(child) {
                if best_score.map_or(true, |b| score > b) {
                    best = child;
                    best_score = Some(score);
                }
            }
        }

        info!(
            current = best.0,
            best_score = ?best_score,
            iterations = self.stats.iterations,
            expansions = self.stats.expansions,
            tree_size = self.tree.len(),
            "Search request complete"
        );

        Ok(SearchResult {
            current: best,
            best_score,
            stats: self.stats.clone(),
        })
    }

    /// Run a single iteration (select -> evaluate -> expand -> backpropagate).
    pub fn iterate(&mut self, rng: &mut ChaCha20Rng) -> IterationOutcome {
        let selected = self.select(rng);
        self.stats.selections += 1;
        let reward = self.evaluate(selected);
        let expanded = self.expand(selected);
        let touched = self.backpropagate(selected, reward);
        self.stats.iterations += 1;

        trace!(
            selected = selected.0,
            reward,
            expanded = expanded.len(),
            path_len = touched,
            "Iteration complete"
        );

        IterationOutcome {
            selected,
            reward,
            expanded,
        }
    }

    /// Descend from the root to the node to work on next.
    ///
    /// Any unvisited child is taken immediately (chosen uniformly at random);
    /// otherwise the UCT-maximising child is followed. Stops at leaves and at
    /// `max_depth`.
    pub fn select(&self, rng: &mut ChaCha20Rng) -> NodeId {
        let mut current = self.tree.root();

        loop {
            let node = self.tree.get(current);

            if node.state.depth >= self.config.max_depth {
                return current;
            }

            let unvisited: Vec<NodeId> = node
                .children
                .iter()
                .map(|(_, id)| *id)
                .filter(|id| self.tree.get(*id).visit_count == 0)
                .collect();
            if let Some(&choice) = unvisited.choose(rng) {
                debug!(node = choice.0, "Selected unvisited child");
                return choice;
            }

            match self
                .tree
                .select_child(current, self.config.exploration_constant)
            {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Reward for `node_id`, reviewing it first if no score is cached.
    ///
    /// Never fails: a scorer error, or a review without a usable average or
    /// with a non-finite aspect score, yields [`fallback_reward`] and leaves
    /// the node's scores untouched.
    pub fn evaluate(&mut self, node_id: NodeId) -> f64 {
        let node = self.tree.get(node_id);
        if let Some(score) = node.state.average_score.filter(|s| *s > 0.0) {
            return score_to_reward(score);
        }

        let depth = node.state.depth;
        self.stats.scorer_calls += 1;

        let review = match self.scorer.score(&node.state.content) {
            Ok(review) => review,
            Err(e) => {
                warn!(node = node_id.0, error = %e, "Scorer failed, using fallback reward");
                self.stats.scorer_failures += 1;
                return self.fallback(depth);
            }
        };

        let Some(average) = review.usable_average() else {
            warn!(node = node_id.0, "Review is malformed, using fallback reward");
            self.stats.malformed_reviews += 1;
            return self.fallback(depth);
        };

        let state = &mut self.tree.get_mut(node_id).state;
        state.review_scores = review.scores;
        state.review_feedback = review.feedback;
        state.average_score = Some(average);

        debug!(node = node_id.0, average_score = average, "Node reviewed");
        score_to_reward(average)
    }

    fn fallback(&mut self, depth: u32) -> f64 {
        self.stats.fallback_rewards += 1;
        fallback_reward(depth)
    }

    /// Apply each action not yet represented and review the new children.
    ///
    /// Restart children attach to the root; every other action attaches to
    /// `node_id`. An action is skipped when its attach point already has a
    /// child with that label. Mutator failures are logged and skipped so the
    /// action can be retried on a later pass. Returns the new child ids.
    pub fn expand(&mut self, node_id: NodeId) -> Vec<NodeId> {
        let mut created = Vec::new();
        if self.tree.get(node_id).state.depth >= self.config.max_depth {
            return created;
        }

        for action in Action::ALL {
            let parent_id = if action.attaches_to_root() {
                self.tree.root()
            } else {
                node_id
            };
            if self.tree.get(parent_id).has_child_for(action) {
                continue;
            }

            let result = self.mutator.apply(&self.tree.get(node_id).state, action);
            let state = match result {
                Ok(state) => state,
                Err(e) => {
                    self.stats.mutator_failures += 1;
                    warn!(node = node_id.0, %action, error = %e, "Mutator failed, skipping action");
                    continue;
                }
            };

            let state = self.normalize_child_state(parent_id, state);
            let child_id = self.tree.add_child(parent_id, state, action);
            self.stats.expansions += 1;
            debug!(
                node = node_id.0,
                parent = parent_id.0,
                child = child_id.0,
                %action,
                "Expanded"
            );

            self.evaluate(child_id);
            created.push(child_id);
        }

        created
    }

    /// Pin depth, goal and subject of a mutated state to its attach point and
    /// drop any review carried over from the source idea.
    fn normalize_child_state(&self, parent_id: NodeId, mut state: IdeaState) -> IdeaState {
        let parent = &self.tree.get(parent_id).state;
        state.review_scores.clear();
        state.review_feedback.clear();
        state.average_score = None;
        state.depth = parent.depth + 1;
        state.research_goal = parent.research_goal.clone();
        if state.subject.is_none() {
            state.subject = parent.subject.clone();
        }
        state
    }

    /// Backpropagate `reward` from `leaf` using the configured discount.
    pub fn backpropagate(&mut self, leaf: NodeId, reward: f64) -> usize {
        self.tree
            .backpropagate(leaf, reward, self.config.discount_factor)
    }

    /// Search statistics so far.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &IdeaTree {
        self.tree
    }

    fn reviewed_score(&self, node_id: NodeId) -> Option<f64> {
        self.tree
            .get(node_id)
            .state
            .average_score
            .filter(|s| *s > 0.0)
    }
}

/// Convenience function to run one search request over `tree`.
pub fn run_iterations<M: Mutator + ?Sized, S: Scorer + ?Sized>(
    tree: &mut IdeaTree,
    current: NodeId,
    mutator: &M,
    scorer: &S,
    config: SearchConfig,
    rng: &mut ChaCha20Rng,
) -> Result<SearchResult, SearchError> {
    let mut search = IdeaSearch::new(tree, mutator, scorer, config)?;
    search.run(current, rng)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "collaborator panicked".to_string()
    }
}
