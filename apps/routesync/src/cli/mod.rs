//! # routesync CLI Module
//!
//! This module implements the CLI interface for routesync.
//!
//! ## Available Commands
//!
//! - `replay` - Replay a scenario against a live binding
//! - `match` - Match a pathname against a route table
//! - `check` - Validate a scenario file

mod commands;

use clap::{Parser, Subcommand};
use routesync_core::SyncError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// routesync - keep a navigation source and an application store in sync
///
/// Replays scripted navigation and time-travel sessions against the
/// in-memory collaborators and reports every dispatch and correction.
#[derive(Parser, Debug)]
#[command(name = "routesync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scenario file
    Replay {
        /// Path to the scenario file (TOML)
        #[arg(short, long)]
        scenario: PathBuf,
    },

    /// Match a pathname against a route table
    Match {
        /// Path to the route file (TOML)
        #[arg(short, long)]
        routes: PathBuf,

        /// Pathname to match, e.g. /users/42
        pathname: String,
    },

    /// Validate a scenario file without replaying it
    Check {
        /// Path to the scenario file (TOML)
        #[arg(short, long)]
        scenario: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), SyncError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Replay { scenario } => cmd_replay(&scenario, json_mode),
        Commands::Match { routes, pathname } => cmd_match(&routes, &pathname, json_mode),
        Commands::Check { scenario } => cmd_check(&scenario, json_mode),
    }
}
