//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so every binary agrees on
//! the same values without shipping the file alongside it.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    search: SearchDefaults,
    gating: GatingDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    iterations: u32,
    exploration_constant: f64,
    max_depth: u32,
    discount_factor: f64,
    max_iterations_per_request: u32,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct GatingDefaults {
    thresholds: BTreeMap<String, f64>,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Search
pub fn iterations() -> u32 {
    DEFAULTS.search.iterations
}
pub fn exploration_constant() -> f64 {
    DEFAULTS.search.exploration_constant
}
pub fn max_depth() -> u32 {
    DEFAULTS.search.max_depth
}
pub fn discount_factor() -> f64 {
    DEFAULTS.search.discount_factor
}
pub fn max_iterations_per_request() -> u32 {
    DEFAULTS.search.max_iterations_per_request
}
pub fn seed() -> u64 {
    DEFAULTS.search.seed
}

// Gating
pub fn gating_thresholds() -> &'static BTreeMap<String, f64> {
    &DEFAULTS.gating.thresholds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        // Just accessing these will verify the TOML parses correctly
        assert_eq!(data_dir(), "./data");
        assert_eq!(log_level(), "info");
    }

    #[test]
    fn test_search_defaults() {
        assert_eq!(iterations(), 1);
        assert!((exploration_constant() - 1.414).abs() < f64::EPSILON);
        assert_eq!(max_depth(), 5);
        assert!((discount_factor() - 0.9).abs() < f64::EPSILON);
        assert_eq!(max_iterations_per_request(), 5);
        assert_eq!(seed(), 42);
    }

    #[test]
    fn test_gating_defaults() {
        let gates = gating_thresholds();
        assert_eq!(gates.len(), 2);
        assert_eq!(gates.get("safety_practicality"), Some(&6.0));
        assert_eq!(gates.get("data_analysis_viability"), Some(&6.0));
    }
}
