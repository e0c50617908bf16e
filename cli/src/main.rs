//! ideatree - inspection tool for saved idea search trees
//!
//! Reads JSON snapshots written by the search engine and prints:
//! 1. Tree statistics and an outline (`inspect`)
//! 2. The best reviewed idea that clears the viability gates (`best`)
//! 3. A single node with its path from the root (`node`)
//! 4. The effective configuration (`config`)
//!
//! The binary never runs a search. `config` reports the `[search]` values
//! that applications embedding the engine build their sessions from.

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod commands;
mod config;

use crate::config::{effective_gates, Command, Config, CENTRAL_CONFIG};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Reports go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, data_dir = %config.data_dir, "Tracing initialized");

    let report = match &config.command {
        Command::Inspect { tree, depth } => {
            let tree = commands::load_tree(&config.tree_path(tree))?;
            commands::inspect(&tree, *depth)
        }
        Command::Best {
            tree,
            gates,
            no_gates,
        } => {
            let tree = commands::load_tree(&config.tree_path(tree))?;
            let gates = effective_gates(&CENTRAL_CONFIG, gates, *no_gates);
            commands::best(&tree, &gates)
        }
        Command::Node { tree, id } => {
            let tree = commands::load_tree(&config.tree_path(tree))?;
            commands::node(&tree, *id)?
        }
        Command::Config => commands::show_config(&CENTRAL_CONFIG),
    };

    print!("{report}");
    Ok(())
}
