//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from subdirectory)
    "/app/config.toml", // Docker container
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by IDEATREE_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Docker container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var("IDEATREE_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from IDEATREE_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "IDEATREE_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &PathBuf) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, u64, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: IDEATREE_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "IDEATREE_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "IDEATREE_COMMON_LOG_LEVEL");

    // Search
    env_override!(
        config,
        search.iterations,
        "IDEATREE_SEARCH_ITERATIONS",
        parse
    );
    env_override!(
        config,
        search.exploration_constant,
        "IDEATREE_SEARCH_EXPLORATION_CONSTANT",
        parse
    );
    env_override!(config, search.max_depth, "IDEATREE_SEARCH_MAX_DEPTH", parse);
    env_override!(
        config,
        search.discount_factor,
        "IDEATREE_SEARCH_DISCOUNT_FACTOR",
        parse
    );
    env_override!(
        config,
        search.max_iterations_per_request,
        "IDEATREE_SEARCH_MAX_ITERATIONS_PER_REQUEST",
        parse
    );
    env_override!(config, search.seed, "IDEATREE_SEARCH_SEED", parse);

    // Gating: a whole map in one variable
    if let Ok(raw) = std::env::var("IDEATREE_GATING_THRESHOLDS") {
        match parse_thresholds(&raw) {
            Some(thresholds) => config.gating.thresholds = thresholds,
            None => warn!(
                "Ignoring malformed IDEATREE_GATING_THRESHOLDS={:?}, expected aspect=value,...",
                raw
            ),
        }
    }

    config
}

/// Parse `aspect=value,aspect=value` into a threshold map.
///
/// An empty string yields an empty map (gating disabled). Returns `None` if any
/// entry is malformed.
pub(crate) fn parse_thresholds(raw: &str) -> Option<BTreeMap<String, f64>> {
    let mut thresholds = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (aspect, value) = entry.split_once('=')?;
        let aspect = aspect.trim();
        if aspect.is_empty() {
            return None;
        }
        let value: f64 = value.trim().parse().ok()?;
        thresholds.insert(aspect.to_string(), value);
    }
    Some(thresholds)
}
