//! One user's exploration session: a tree, a current-node pointer and a busy
//! flag that rejects overlapping search requests.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::evaluator::Scorer;
use crate::mutator::Mutator;
use crate::node::{NodeId, TreeNode};
use crate::search::{self, SearchError, SearchResult};
use crate::snapshot::{NodeSnapshot, SnapshotError};
use crate::tree::IdeaTree;

/// Result of asking a session to search.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(SearchResult),

    /// Another request was already running; nothing was done.
    Busy,
}

impl RunOutcome {
    pub fn is_busy(&self) -> bool {
        matches!(self, RunOutcome::Busy)
    }

    pub fn completed(self) -> Option<SearchResult> {
        match self {
            RunOutcome::Completed(result) => Some(result),
            RunOutcome::Busy => None,
        }
    }
}

struct SessionState {
    tree: IdeaTree,
    current: NodeId,
    rng: ChaCha20Rng,
}

/// Clears the busy flag when dropped, including during unwinding.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An exploration session over a single idea tree.
pub struct Session<M: Mutator, S: Scorer> {
    mutator: M,
    scorer: S,
    config: SearchConfig,
    state: Mutex<SessionState>,
    busy: AtomicBool,
}

impl<M: Mutator, S: Scorer> Session<M, S> {
    /// Start a session whose root holds `research_goal`.
    pub fn start(
        research_goal: impl Into<String>,
        config: SearchConfig,
        mutator: M,
        scorer: S,
    ) -> Self {
        let tree = IdeaTree::new(research_goal);
        info!(seed = config.seed, "Session started");
        Self {
            state: Mutex::new(SessionState {
                current: tree.root(),
                tree,
                rng: ChaCha20Rng::seed_from_u64(config.seed),
            }),
            mutator,
            scorer,
            config,
            busy: AtomicBool::new(false),
        }
    }

    /// Run `count` iterations from the current node and move the pointer to
    /// the best node found.
    ///
    /// Returns [`RunOutcome::Busy`] at once if another request holds the
    /// session. The busy flag is released on every exit path.
    pub fn run_iterations(
        &self,
        count: u32,
        max_depth: u32,
        discount_factor: f64,
    ) -> Result<RunOutcome, SearchError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            warn!("Search request rejected: session busy");
            return Ok(RunOutcome::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let config = self
            .config
            .clone()
            .with_iterations(count)
            .with_max_depth(max_depth)
            .with_discount_factor(discount_factor);

        let mut state = self.lock_state();
        let SessionState { tree, current, rng } = &mut *state;
        debug!(current = current.0, count, max_depth, "Search request accepted");

        let result =
            search::run_iterations(tree, *current, &self.mutator, &self.scorer, config, rng)?;
        *current = result.current;
        Ok(RunOutcome::Completed(result))
    }

    /// Whether a search request is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Discard the tree and start over from a new goal.
    pub fn reset(&self, research_goal: impl Into<String>) {
        let mut state = self.lock_state();
        state.tree = IdeaTree::new(research_goal);
        state.current = state.tree.root();
        info!("Session reset");
    }

    pub fn current(&self) -> NodeId {
        self.lock_state().current
    }

    pub fn current_node(&self) -> TreeNode {
        let state = self.lock_state();
        state.tree.get(state.current).clone()
    }

    /// Move the current pointer to `id`. Returns `None` for unknown ids and
    /// leaves the pointer where it was.
    pub fn navigate(&self, id: NodeId) -> Option<TreeNode> {
        let mut state = self.lock_state();
        let node = state.tree.find(id)?.clone();
        state.current = id;
        debug!(node = id.0, "Navigated");
        Some(node)
    }

    /// Move the current pointer to the best viable reviewed node, if any.
    pub fn navigate_to_best(&self) -> NodeId {
        let mut state = self.lock_state();
        if let Some(best) = state.tree.global_best_node(&self.config.gates) {
            state.current = best;
        }
        state.current
    }

    /// Read access to the tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&IdeaTree) -> R) -> R {
        f(&self.lock_state().tree)
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        self.lock_state().tree.to_snapshot()
    }

    /// Replace the tree with a saved one. The current pointer moves to its
    /// root. On error the session is left unchanged.
    pub fn restore(&self, snapshot: &NodeSnapshot) -> Result<(), SnapshotError> {
        let tree = IdeaTree::from_snapshot(snapshot)?;
        let mut state = self.lock_state();
        state.current = tree.root();
        state.tree = tree;
        info!(nodes = state.tree.len(), "Session restored from snapshot");
        Ok(())
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Collaborator panics are caught inside the search, so a poisoned lock
    /// still guards a consistent tree.
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
