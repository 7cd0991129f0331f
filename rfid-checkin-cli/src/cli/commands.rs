//! CLI command definitions.

use clap::{Args, Subcommand};
use rfid_checkin_core::Uid;

/// Arguments for the tap loop.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Use the first reader whose name starts with this prefix
    #[arg(short, long, value_name = "PREFIX")]
    pub reader: Option<String>,

    /// Stop after this many taps instead of running forever
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,
}

/// User administration commands.
#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List all registered tags
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a single tag
    Show {
        /// Tag UID in hex
        uid: Uid,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Register a tag under a name before its first tap
    Add {
        /// Tag UID in hex
        uid: Uid,
        /// Name to greet the holder with
        username: String,
    },

    /// Change the name a tag is greeted with
    Rename {
        /// Tag UID in hex
        uid: Uid,
        /// Name to greet the holder with
        username: String,
    },

    /// Delete a tag and its history
    Remove {
        /// Tag UID in hex
        uid: Uid,
    },

    /// Reset a tag's tap count so its next tap checks in
    Reset {
        /// Tag UID in hex
        uid: Uid,
    },
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}
