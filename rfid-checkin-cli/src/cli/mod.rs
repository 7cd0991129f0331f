//! Command-line interface for the `rfid-checkin` binary.

mod commands;

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};

use crate::storage::User;

pub use commands::{ConfigCommand, RunCommand, StatsCommand, UsersCommand};

/// rfid-checkin - RFID tap check-in/check-out station
///
/// Every tap of a tag on the reader alternates between checking its holder
/// in and out, tracked per tag UID in a local database.
#[derive(Debug, Parser)]
#[command(name = "rfid-checkin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the reader and record taps
    Run(RunCommand),

    /// List connected PC/SC readers
    Readers,

    /// Administer registered tags
    #[command(subcommand)]
    Users(UsersCommand),

    /// Show check-in totals
    Stats(StatsCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

/// Header line matching [`format_user_row`].
#[must_use]
pub fn user_table_header() -> String {
    table_row("UID", "NAME", "TAPS", "STATUS", "LAST SCAN")
}

/// Render one user as a fixed width table row.
#[must_use]
pub fn format_user_row(user: &User) -> String {
    let status = if user.is_checked_in() { "in" } else { "out" };
    table_row(
        &user.uid,
        user.username.as_deref().unwrap_or("-"),
        &user.tap_count.to_string(),
        status,
        &format_scan_time(user.last_scan_time),
    )
}

fn table_row(uid: &str, name: &str, taps: &str, status: &str, last_scan: &str) -> String {
    format!("{uid:<20}  {name:<20}  {taps:>4}  {status:<6}  {last_scan}")
}

fn format_scan_time(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(
        || "never".to_string(),
        |time| {
            time.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;

    fn user(tap_count: u32) -> User {
        User {
            uid: "04A21F0B".to_string(),
            username: Some("alice".to_string()),
            tap_count,
            last_scan_time: None,
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "rfid-checkin");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let quiet = Cli::try_parse_from(["rfid-checkin", "-q", "stats"]).unwrap();
        assert_eq!(quiet.verbosity(), crate::logging::Verbosity::Quiet);

        let normal = Cli::try_parse_from(["rfid-checkin", "stats"]).unwrap();
        assert_eq!(normal.verbosity(), crate::logging::Verbosity::Normal);

        let verbose = Cli::try_parse_from(["rfid-checkin", "-v", "stats"]).unwrap();
        assert_eq!(verbose.verbosity(), crate::logging::Verbosity::Verbose);

        let trace = Cli::try_parse_from(["rfid-checkin", "-vv", "stats"]).unwrap();
        assert_eq!(trace.verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_parse_run() {
        let cli =
            Cli::try_parse_from(["rfid-checkin", "run", "--reader", "ACS ACR122", "-l", "3"])
                .unwrap();
        match cli.command {
            Command::Run(run) => {
                assert_eq!(run.reader.as_deref(), Some("ACS ACR122"));
                assert_eq!(run.limit, Some(3));
            }
            other => panic!("Expected run command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["rfid-checkin", "run"]).unwrap();
        match cli.command {
            Command::Run(run) => {
                assert!(run.reader.is_none());
                assert!(run.limit.is_none());
            }
            other => panic!("Expected run command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_users_rename() {
        let cli =
            Cli::try_parse_from(["rfid-checkin", "users", "rename", "04a21f0b", "alice"]).unwrap();
        match cli.command {
            Command::Users(UsersCommand::Rename { uid, username }) => {
                assert_eq!(uid.to_string(), "04A21F0B");
                assert_eq!(username, "alice");
            }
            other => panic!("Expected users rename, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_uid() {
        assert!(Cli::try_parse_from(["rfid-checkin", "users", "remove", "XYZ"]).is_err());
        assert!(Cli::try_parse_from(["rfid-checkin", "users", "remove", "ABCD"]).is_err());
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["rfid-checkin", "-c", "/etc/checkin.toml", "readers"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/checkin.toml")));
        assert!(matches!(cli.command, Command::Readers));
    }

    #[test]
    fn test_format_user_row_status() {
        assert!(format_user_row(&user(1)).contains(" in "));
        assert!(format_user_row(&user(2)).contains(" out "));
    }

    #[test]
    fn test_format_user_row_columns() {
        let row = format_user_row(&user(3));
        assert!(row.starts_with("04A21F0B"));
        assert!(row.contains("alice"));
        assert!(row.ends_with("never"));

        let unnamed = User {
            username: None,
            ..user(1)
        };
        assert!(format_user_row(&unnamed).contains(" - "));
    }

    #[test]
    fn test_header_aligns_with_rows() {
        let header = user_table_header();
        let row = format_user_row(&user(1));
        assert_eq!(header.find("NAME"), row.find("alice"));
        assert_eq!(header.find("STATUS"), row.find("in "));
    }

    #[test]
    fn test_format_scan_time() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let formatted = format_scan_time(Some(time));
        assert_eq!(formatted.len(), "2024-03-01 09:30:00".len());
        assert_eq!(format_scan_time(None), "never");
    }
}
