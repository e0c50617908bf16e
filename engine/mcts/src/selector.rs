//! Best-node queries over an idea tree.
//!
//! Two different questions get asked of a finished search:
//! - which direct child looks best by search value (local navigation), and
//! - which reviewed idea anywhere in the tree scores highest while clearing
//!   every viability gate (the "best idea" shown to the user).

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::node::{NodeId, TreeNode};
use crate::tree::IdeaTree;

/// Minimum per-aspect review scores a node must meet to count as viable.
///
/// Aspects absent from a node's review pass by default.
#[derive(Debug, Clone, PartialEq)]
pub struct ViabilityGates {
    thresholds: BTreeMap<String, f64>,
}

impl Default for ViabilityGates {
    /// Safety and data-analysis viability must both reach 6.0.
    fn default() -> Self {
        Self::none()
            .with_gate("safety_practicality", 6.0)
            .with_gate("data_analysis_viability", 6.0)
    }
}

impl ViabilityGates {
    /// No gating at all.
    pub fn none() -> Self {
        Self {
            thresholds: BTreeMap::new(),
        }
    }

    pub fn with_gate(mut self, aspect: impl Into<String>, threshold: f64) -> Self {
        self.thresholds.insert(aspect.into(), threshold);
        self
    }

    pub fn thresholds(&self) -> &BTreeMap<String, f64> {
        &self.thresholds
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// First gate the node fails, as (aspect, score, threshold).
    /// A non-finite score for a gated aspect fails that gate.
    pub fn first_failure<'a>(&'a self, node: &TreeNode) -> Option<(&'a str, f64, f64)> {
        self.thresholds.iter().find_map(|(aspect, &threshold)| {
            node.state
                .review_scores
                .get(aspect)
                .filter(|&&score| !score.is_finite() || score < threshold)
                .map(|&score| (aspect.as_str(), score, threshold))
        })
    }

    /// Whether the node clears every gate.
    pub fn admits(&self, node: &TreeNode) -> bool {
        self.first_failure(node).is_none()
    }
}

impl From<BTreeMap<String, f64>> for ViabilityGates {
    fn from(thresholds: BTreeMap<String, f64>) -> Self {
        Self { thresholds }
    }
}

impl IdeaTree {
    /// Direct child of `node_id` with the highest search value, ignoring
    /// unvisited children. Ties keep the earliest child.
    pub fn exploitation_best_child(&self, node_id: NodeId) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child_id) in &self.get(node_id).children {
            let child = self.get(child_id);
            if child.visit_count == 0 {
                continue;
            }
            match best {
                Some((_, value)) if child.value <= value => {}
                _ => best = Some((child_id, child.value)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Highest-scoring reviewed node in the whole tree that clears `gates`.
    ///
    /// Nodes with no score or a score of exactly 0 are skipped as unreviewed.
    /// Visits each node once; returns `None` when nothing qualifies.
    pub fn global_best_node(&self, gates: &ViabilityGates) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        let mut stack = vec![self.root()];

        while let Some(id) = stack.pop() {
            let node = self.get(id);
            stack.extend(node.children.iter().map(|(_, child)| *child));

            let average = match node.state.average_score {
                Some(score) if score != 0.0 => score,
                _ => continue,
            };

            if let Some((aspect, score, threshold)) = gates.first_failure(node) {
                debug!(
                    node = id.0,
                    aspect, score, threshold, "Skipping node below viability gate"
                );
                continue;
            }

            match best {
                Some((_, best_score)) if average <= best_score => {}
                _ => best = Some((id, average)),
            }
        }

        match best {
            Some((id, score)) => info!(node = id.0, average_score = score, "Best node selected"),
            None => info!("No viable reviewed node found in tree"),
        }

        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::node::IdeaState;

    fn scored(text: &str, average: Option<f64>, scores: &[(&str, f64)]) -> IdeaState {
        let mut state = IdeaState::with_content(text);
        state.average_score = average;
        state.review_scores = scores.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        state
    }

    #[test]
    fn test_exploitation_best_child_ignores_unvisited() {
        let mut tree = IdeaTree::new("goal");
        let a = tree.add_child(tree.root(), scored("a", None, &[]), Action::RefineWithFeedback);
        let b = tree.add_child(tree.root(), scored("b", None, &[]), Action::RefineWithRetrieval);
        let c = tree.add_child(tree.root(), scored("c", None, &[]), Action::RestartFresh);

        assert_eq!(tree.exploitation_best_child(tree.root()), None);

        tree.get_mut(a).update(0.4);
        tree.get_mut(b).update(0.7);
        // c stays unvisited even though its value would win
        tree.get_mut(c).value = 0.95;

        assert_eq!(tree.exploitation_best_child(tree.root()), Some(b));
    }

    #[test]
    fn test_global_best_skips_unreviewed_and_zero() {
        let mut tree = IdeaTree::new("goal");
        tree.add_child(tree.root(), scored("none", None, &[]), Action::RefineWithFeedback);
        tree.add_child(tree.root(), scored("zero", Some(0.0), &[]), Action::RefineWithRetrieval);

        assert_eq!(tree.global_best_node(&ViabilityGates::none()), None);

        let ok = tree.add_child(tree.root(), scored("ok", Some(3.0), &[]), Action::RestartFresh);
        assert_eq!(tree.global_best_node(&ViabilityGates::none()), Some(ok));
    }

    #[test]
    fn test_global_best_respects_gates_over_raw_score() {
        let mut tree = IdeaTree::new("goal");
        let unsafe_idea = tree.add_child(
            tree.root(),
            scored("unsafe", Some(9.5), &[("safety_practicality", 4.0)]),
            Action::RefineWithFeedback,
        );
        let deep_parent = tree.add_child(
            tree.root(),
            scored("parent", Some(5.0), &[("safety_practicality", 8.0)]),
            Action::RefineWithRetrieval,
        );
        let viable = tree.add_child(
            deep_parent,
            scored(
                "viable",
                Some(7.5),
                &[("safety_practicality", 6.0), ("data_analysis_viability", 7.0)],
            ),
            Action::RefineWithFeedback,
        );

        let gates = ViabilityGates::default();
        assert_eq!(tree.global_best_node(&gates), Some(viable));

        // Without gating the raw maximum wins
        assert_eq!(
            tree.global_best_node(&ViabilityGates::none()),
            Some(unsafe_idea)
        );
    }

    #[test]
    fn test_missing_aspect_passes_gate() {
        let mut tree = IdeaTree::new("goal");
        let node = tree.add_child(
            tree.root(),
            scored("no aspects", Some(6.0), &[("novelty", 2.0)]),
            Action::RefineWithFeedback,
        );

        let gates = ViabilityGates::none().with_gate("feasibility", 9.0);
        assert!(gates.admits(tree.get(node)));
        assert_eq!(tree.global_best_node(&gates), Some(node));
    }

    #[test]
    fn test_non_finite_aspect_fails_gate() {
        let mut tree = IdeaTree::new("goal");
        let broken = tree.add_child(
            tree.root(),
            scored("broken", Some(9.0), &[("safety_practicality", f64::NAN)]),
            Action::RefineWithFeedback,
        );
        let sound = tree.add_child(
            tree.root(),
            scored("sound", Some(6.5), &[("safety_practicality", 7.0)]),
            Action::RefineWithRetrieval,
        );

        let gates = ViabilityGates::default();
        assert!(!gates.admits(tree.get(broken)));
        assert_eq!(tree.global_best_node(&gates), Some(sound));
    }

    #[test]
    fn test_global_best_considers_root() {
        let mut state = IdeaState::root("goal");
        state.average_score = Some(6.0);
        let mut tree = IdeaTree::with_root_state(state);
        tree.add_child(tree.root(), scored("worse", Some(5.0), &[]), Action::RefineWithFeedback);

        assert_eq!(
            tree.global_best_node(&ViabilityGates::none()),
            Some(tree.root())
        );
    }

    #[test]
    fn test_gates_from_map() {
        let map: BTreeMap<String, f64> = [("novelty".to_string(), 5.0)].into_iter().collect();
        let gates = ViabilityGates::from(map);
        assert_eq!(gates.thresholds().get("novelty"), Some(&5.0));
        assert!(!gates.is_empty());
        assert!(ViabilityGates::none().is_empty());
    }
}
