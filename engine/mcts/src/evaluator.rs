//! Scorer trait for idea evaluation.
//!
//! The scorer turns idea text into per-aspect review scores. In production this
//! is a rubric-driven model call; the search only sees the numbers.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while scoring an idea.
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("Review failed: {0}")]
    ReviewFailed(String),

    #[error("Malformed review: {0}")]
    MalformedReview(String),

    #[error("Reviewer unavailable: {0}")]
    Unavailable(String),
}

/// Result of reviewing an idea.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Review {
    /// Aspect name -> score on a 1-10 scale.
    pub scores: BTreeMap<String, f64>,

    /// Aspect name -> reviewer commentary.
    pub feedback: BTreeMap<String, String>,

    /// Overall score on a 1-10 scale. `None` means the reviewer produced
    /// nothing usable, which the search treats like a failed review.
    pub average_score: Option<f64>,
}

impl Review {
    /// Build a review whose average is the mean of `scores`.
    pub fn from_scores<I, K>(scores: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let scores: BTreeMap<String, f64> =
            scores.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let average_score = if scores.is_empty() {
            None
        } else {
            Some(scores.values().sum::<f64>() / scores.len() as f64)
        };
        Self {
            scores,
            feedback: BTreeMap::new(),
            average_score,
        }
    }

    /// Usable overall score, if the reviewer produced one.
    ///
    /// A review with any non-finite aspect score is unusable as a whole.
    pub fn usable_average(&self) -> Option<f64> {
        if !self.scores.values().all(|s| s.is_finite()) {
            return None;
        }
        self.average_score.filter(|s| s.is_finite())
    }
}

/// Trait for idea reviewers.
///
/// Calls are blocking. Timeouts and retries belong to the implementation, not
/// the search.
pub trait Scorer: Send + Sync {
    /// Review a single idea.
    fn score(&self, content: &str) -> Result<Review, ScorerError>;
}

impl<S: Scorer + ?Sized> Scorer for std::sync::Arc<S> {
    fn score(&self, content: &str) -> Result<Review, ScorerError> {
        (**self).score(content)
    }
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn score(&self, content: &str) -> Result<Review, ScorerError> {
        (**self).score(content)
    }
}
