//! Scripted collaborators shared by the crate's tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;

use crate::action::Action;
use crate::evaluator::{Review, Scorer, ScorerError};
use crate::mutator::{Mutator, MutatorError};
use crate::node::IdeaState;

/// Appends the action label to the idea: `"<content> -> <label>"`.
fn mutate(state: &IdeaState, action: Action) -> IdeaState {
    IdeaState::with_content(format!("{} -> {}", state.content, action.label()))
}

/// Deterministic mutator that fails for a configurable set of actions.
#[derive(Default)]
pub(crate) struct ScriptedMutator {
    failing: Vec<Action>,
    calls: AtomicUsize,
}

impl ScriptedMutator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self, action: Action) -> Self {
        self.failing.push(action);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Mutator for ScriptedMutator {
    fn apply(&self, state: &IdeaState, action: Action) -> Result<IdeaState, MutatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&action) {
            return Err(MutatorError::GenerationFailed {
                action,
                reason: "scripted failure".into(),
            });
        }
        Ok(mutate(state, action))
    }
}

/// Mutator that returns a modified clone of its input, review fields included.
#[derive(Default)]
pub(crate) struct CloneMutator;

impl Mutator for CloneMutator {
    fn apply(&self, state: &IdeaState, action: Action) -> Result<IdeaState, MutatorError> {
        let mut next = state.clone();
        next.content = format!("{} -> {}", state.content, action.label());
        Ok(next)
    }
}

/// Mutator that succeeds for the first `ok_calls` calls and panics after.
pub(crate) struct PanickingMutator {
    ok_calls: usize,
    calls: AtomicUsize,
}

impl PanickingMutator {
    pub(crate) fn after(ok_calls: usize) -> Self {
        Self {
            ok_calls,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Mutator for PanickingMutator {
    fn apply(&self, state: &IdeaState, action: Action) -> Result<IdeaState, MutatorError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.ok_calls {
            panic!("mutator exploded");
        }
        Ok(mutate(state, action))
    }
}

/// Mutator that reports each call on `entered` and then waits for `release`.
pub(crate) struct BlockingMutator {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl BlockingMutator {
    pub(crate) fn new(entered: Sender<()>, release: Receiver<()>) -> Self {
        Self {
            entered: Mutex::new(entered),
            release: Mutex::new(release),
        }
    }
}

impl Mutator for BlockingMutator {
    fn apply(&self, state: &IdeaState, action: Action) -> Result<IdeaState, MutatorError> {
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        Ok(mutate(state, action))
    }
}

/// Scorer that picks a score by content suffix, falling back to a default.
/// Content matching nothing, with no default set, fails to review.
#[derive(Default)]
pub(crate) struct ScriptedScorer {
    default: Option<f64>,
    suffixes: Vec<(String, f64)>,
    calls: AtomicUsize,
}

impl ScriptedScorer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn default_score(mut self, score: f64) -> Self {
        self.default = Some(score);
        self
    }

    pub(crate) fn score_suffix(mut self, suffix: &str, score: f64) -> Self {
        self.suffixes.push((suffix.to_string(), score));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Scorer for ScriptedScorer {
    fn score(&self, content: &str) -> Result<Review, ScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let score = self
            .suffixes
            .iter()
            .find(|(suffix, _)| content.ends_with(suffix.as_str()))
            .map(|(_, score)| *score)
            .or(self.default)
            .ok_or_else(|| ScorerError::Unavailable(format!("no script for {content:?}")))?;
        Ok(Review::from_scores([("overall", score)]))
    }
}

/// Scorer that always fails.
#[derive(Default)]
pub(crate) struct FailingScorer {
    calls: AtomicUsize,
}

impl FailingScorer {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Scorer for FailingScorer {
    fn score(&self, _content: &str) -> Result<Review, ScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ScorerError::ReviewFailed("scripted failure".into()))
    }
}

/// Scorer backed by a closure.
pub(crate) struct FnScorer<F>(F);

impl<F> Scorer for FnScorer<F>
where
    F: Fn(&str) -> Result<Review, ScorerError> + Send + Sync,
{
    fn score(&self, content: &str) -> Result<Review, ScorerError> {
        (self.0)(content)
    }
}

pub(crate) fn content_scorer<F>(f: F) -> FnScorer<F>
where
    F: Fn(&str) -> Result<Review, ScorerError> + Send + Sync,
{
    FnScorer(f)
}
