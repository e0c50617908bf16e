//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;
use std::collections::BTreeMap;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_iterations() -> u32 {
    defaults::iterations()
}
fn d_exploration_constant() -> f64 {
    defaults::exploration_constant()
}
fn d_max_depth() -> u32 {
    defaults::max_depth()
}
fn d_discount_factor() -> f64 {
    defaults::discount_factor()
}
fn d_max_iterations_per_request() -> u32 {
    defaults::max_iterations_per_request()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_thresholds() -> BTreeMap<String, f64> {
    defaults::gating_thresholds().clone()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub gating: GatingConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// Tree search configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Iterations run per exploration request when the caller does not say
    #[serde(default = "d_iterations")]
    pub iterations: u32,
    /// UCT exploration constant (sqrt(2) by convention)
    #[serde(default = "d_exploration_constant")]
    pub exploration_constant: f64,
    #[serde(default = "d_max_depth")]
    pub max_depth: u32,
    /// Per-hop reward attenuation during backpropagation, in (0, 1]
    #[serde(default = "d_discount_factor")]
    pub discount_factor: f64,
    #[serde(default = "d_max_iterations_per_request")]
    pub max_iterations_per_request: u32,
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: defaults::iterations(),
            exploration_constant: defaults::exploration_constant(),
            max_depth: defaults::max_depth(),
            discount_factor: defaults::discount_factor(),
            max_iterations_per_request: defaults::max_iterations_per_request(),
            seed: defaults::seed(),
        }
    }
}

/// Viability gates applied when picking the best idea in a tree
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GatingConfig {
    /// Minimum per-aspect review score (aspect name -> threshold)
    #[serde(default = "d_thresholds")]
    pub thresholds: BTreeMap<String, f64>,
}

impl Default for GatingConfig {
    fn default() -> Self {
        Self {
            thresholds: d_thresholds(),
        }
    }
}
