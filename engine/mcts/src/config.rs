//! Search configuration parameters.

use crate::search::SearchError;
use crate::selector::ViabilityGates;

/// Configuration for one exploration request.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of select/evaluate/expand/backpropagate cycles per request.
    pub iterations: u32,

    /// Exploration constant `c` in the UCT formula.
    /// sqrt(2) is the textbook choice for rewards in [0, 1].
    pub exploration_constant: f64,

    /// Nodes at this depth are never expanded and stop selection.
    pub max_depth: u32,

    /// Per-hop attenuation applied to the reward on its way to the root.
    /// Must lie in (0, 1]; 1.0 disables discounting.
    pub discount_factor: f64,

    /// Upper bound on `iterations` for a single request.
    pub max_iterations_per_request: u32,

    /// Minimum per-aspect scores for global best-node selection.
    pub gates: ViabilityGates,

    /// Seed for the session RNG that breaks ties among unvisited children.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: 1,
            exploration_constant: std::f64::consts::SQRT_2,
            max_depth: 5,
            discount_factor: 0.9,
            max_iterations_per_request: 5,
            gates: ViabilityGates::default(),
            seed: 42,
        }
    }
}

impl SearchConfig {
    /// Create a config for tests: more iterations allowed, no gating.
    pub fn for_testing() -> Self {
        Self {
            iterations: 4,
            exploration_constant: std::f64::consts::SQRT_2,
            max_depth: 3,
            discount_factor: 0.9,
            max_iterations_per_request: 64,
            gates: ViabilityGates::none(),
            seed: 42,
        }
    }

    /// Builder pattern: set number of iterations.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    /// Builder pattern: set the UCT exploration constant.
    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Builder pattern: set maximum depth.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builder pattern: set discount factor.
    pub fn with_discount_factor(mut self, discount: f64) -> Self {
        self.discount_factor = discount;
        self
    }

    /// Builder pattern: set the per-request iteration cap.
    pub fn with_max_iterations_per_request(mut self, n: u32) -> Self {
        self.max_iterations_per_request = n;
        self
    }

    /// Builder pattern: set viability gates.
    pub fn with_gates(mut self, gates: ViabilityGates) -> Self {
        self.gates = gates;
        self
    }

    /// Builder pattern: set RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject parameter combinations the search cannot run with.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.discount_factor > 0.0 && self.discount_factor <= 1.0) {
            return Err(SearchError::InvalidConfig(format!(
                "discount_factor must be in (0, 1], got {}",
                self.discount_factor
            )));
        }
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "exploration_constant must be finite and non-negative, got {}",
                self.exploration_constant
            )));
        }
        if self.iterations > self.max_iterations_per_request {
            return Err(SearchError::InvalidConfig(format!(
                "iterations ({}) exceeds max_iterations_per_request ({})",
                self.iterations, self.max_iterations_per_request
            )));
        }
        Ok(())
    }
}
