//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! across the Rust components (search engine, CLI).
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`IDEATREE_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! IDEATREE_<SECTION>_<KEY>=value
//!
//! Examples:
//!     IDEATREE_COMMON_DATA_DIR=/data
//!     IDEATREE_COMMON_LOG_LEVEL=debug
//!     IDEATREE_SEARCH_MAX_DEPTH=4
//!     IDEATREE_SEARCH_DISCOUNT_FACTOR=0.95
//!     IDEATREE_GATING_THRESHOLDS=safety_practicality=7,data_analysis_viability=5.5
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
