//! Command-line configuration for the ideatree tool
//!
//! Defaults come from config.toml (with IDEATREE_* environment overrides).
//! CLI arguments take highest priority.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use engine_config::{load_config, CentralConfig};
use idea_mcts::{SearchConfig, ViabilityGates};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

// Load central config once at startup
pub static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

/// Parse `aspect=threshold` for `--gate`.
fn parse_gate(s: &str) -> Result<(String, f64), String> {
    let (aspect, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected aspect=threshold, got '{s}'"))?;
    let aspect = aspect.trim();
    if aspect.is_empty() {
        return Err(format!("missing aspect name in '{s}'"));
    }
    let threshold: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid threshold '{}' for {aspect}", value.trim()))?;
    Ok((aspect.to_string(), threshold))
}

#[derive(Parser, Debug, Clone)]
#[command(name = "ideatree")]
#[command(about = "Inspect idea search trees saved as JSON snapshots")]
#[command(
    long_about = "Reads tree snapshots written by the idea search engine and reports
statistics, the tree outline, the best viable idea and individual nodes.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value_t = default_log_level())]
    pub log_level: String,

    /// Directory searched for snapshot files given as relative paths
    #[arg(long, global = true, default_value_t = default_data_dir())]
    pub data_dir: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print tree statistics and an indented outline
    Inspect {
        /// Snapshot file
        tree: PathBuf,

        /// Only print the outline down to this depth
        #[arg(long)]
        depth: Option<u32>,
    },

    /// Print the highest-scoring reviewed idea that clears every gate
    Best {
        /// Snapshot file
        tree: PathBuf,

        /// Extra or replacement gate, as aspect=threshold (repeatable)
        #[arg(long = "gate", value_parser = parse_gate)]
        gates: Vec<(String, f64)>,

        /// Ignore all gates, including configured ones
        #[arg(long, conflicts_with = "gates")]
        no_gates: bool,
    },

    /// Print one node in full, with the path from the root
    Node {
        /// Snapshot file
        tree: PathBuf,

        /// Node id
        id: u32,
    },

    /// Print the effective configuration, including the search settings
    /// that embedding applications read (this tool never runs a search)
    Config,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.is_empty() {
            return Err(anyhow!("data_dir cannot be empty"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        if let Command::Best { gates, .. } = &self.command {
            if let Some((aspect, _)) = gates.iter().find(|(_, t)| !t.is_finite()) {
                return Err(anyhow!("gate threshold for {} must be finite", aspect));
            }
        }

        Ok(())
    }

    /// Resolve a snapshot path: existing or absolute paths are used as given,
    /// anything else is looked up under `data_dir`.
    pub fn tree_path(&self, tree: &Path) -> PathBuf {
        if tree.is_absolute() || tree.exists() {
            tree.to_path_buf()
        } else {
            Path::new(&self.data_dir).join(tree)
        }
    }
}

/// Search parameters from the central config.
pub fn search_config(central: &CentralConfig) -> SearchConfig {
    let search = &central.search;
    SearchConfig::default()
        .with_iterations(search.iterations)
        .with_exploration_constant(search.exploration_constant)
        .with_max_depth(search.max_depth)
        .with_discount_factor(search.discount_factor)
        .with_max_iterations_per_request(search.max_iterations_per_request)
        .with_seed(search.seed)
        .with_gates(ViabilityGates::from(central.gating.thresholds.clone()))
}

/// Configured gates with CLI overrides applied.
pub fn effective_gates(
    central: &CentralConfig,
    overrides: &[(String, f64)],
    no_gates: bool,
) -> ViabilityGates {
    if no_gates {
        return ViabilityGates::none();
    }
    overrides
        .iter()
        .fold(search_config(central).gates, |gates, (aspect, threshold)| {
            gates.with_gate(aspect.clone(), *threshold)
        })
}
