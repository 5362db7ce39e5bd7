//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "clearkeeper")]
#[command(about = "Keeps guild roles in sync with solo dungeon and lowman raid clears", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .clearkeeper/
    #[arg(short, long, global = true, env = "CLEARKEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the reconciliation scheduler and the OAuth listener until Ctrl-C
    Run,

    /// Reconcile one guild member now
    Sync {
        /// Guild nickname, e.g. Guardian#1234
        nickname: String,
    },

    /// Resolve a Bungie name to its membership
    Resolve {
        /// Bungie name, e.g. Guardian#1234
        bungie_id: String,
    },

    /// List validated solo dungeon clears
    Dungeons {
        /// Bungie name, e.g. Guardian#1234
        bungie_id: String,
    },

    /// List validated lowman raid clears
    Raids {
        /// Bungie name, e.g. Guardian#1234
        bungie_id: String,
    },

    /// Aggregate stats over every activity of a mode
    Stats {
        /// Bungie name, e.g. Guardian#1234
        bungie_id: String,

        /// Activity mode (4 raid, 82 dungeon, 62 team scorched)
        #[arg(short, long, default_value_t = 62)]
        mode: u32,
    },

    /// Print the OAuth authorization URL
    AuthUrl {
        /// Opaque state echoed back to the callback
        #[arg(short, long)]
        state: Option<String>,
    },
}
