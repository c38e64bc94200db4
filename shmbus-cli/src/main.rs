// SPDX-License-Identifier: Apache-2.0

//! shmbus CLI
//!
//! Command-line companion for shmbus segments: create, inspect, feed,
//! follow, and remove line buses.

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod record;

use config::{BusConfig, ConfigLoader};

/// shmbus - shared memory broadcast bus tool
#[derive(Parser)]
#[command(name = "shmbus")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "shmbus.yaml")]
    pub config: String,

    /// Segment key (overrides the config file)
    #[arg(short, long)]
    pub key: Option<i32>,

    /// Minimum slot count (overrides the config file)
    #[arg(short, long)]
    pub slots: Option<u64>,

    /// Schema tag carried in segment metadata (overrides the config file)
    #[arg(long)]
    pub schema: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create and initialize the bus segment
    Create,

    /// Show bus segment facts
    Stat {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Push stdin lines onto the bus, one record per line
    Feed,

    /// Follow records from the bus
    Tail {
        /// Start from this sequence number instead of the live tail
        #[arg(long)]
        from: Option<u64>,

        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Remove the bus segment
    Remove,

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let Cli {
        config,
        key,
        slots,
        schema,
        command,
        ..
    } = cli;

    // Dispatch to command handlers
    match command {
        Commands::Create => commands::create::execute(&resolve(&config, key, slots, schema)),
        Commands::Stat { json } => {
            commands::stat::execute(&resolve(&config, key, slots, schema), json)
        }
        Commands::Feed => commands::feed::execute(&resolve(&config, key, slots, schema)),
        Commands::Tail { from, limit } => {
            commands::tail::execute(&resolve(&config, key, slots, schema), from, limit)
        }
        Commands::Remove => commands::remove::execute(&resolve(&config, key, slots, schema)),
        Commands::Validate { file } => commands::validate::execute(&file),
    }
}

/// Flag-over-file resolution, refusing to continue on invalid values.
fn resolve(
    config: &str,
    key: Option<i32>,
    slots: Option<u64>,
    schema: Option<String>,
) -> BusConfig {
    match ConfigLoader::resolve(config, key, slots, schema) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}
