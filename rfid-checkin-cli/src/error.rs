//! Error types for the check-in station.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for check-in operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database statement failed.
    #[error("database query failed: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// No row exists for the UID.
    #[error("no user registered with UID {uid}")]
    UnknownUser {
        /// The UID that was looked up.
        uid: String,
    },

    /// A row already exists for the UID.
    #[error("a user is already registered with UID {uid}")]
    UserExists {
        /// The UID that was inserted.
        uid: String,
    },

    /// The tap count cannot be incremented any further.
    #[error("tap count for UID {uid} is at its maximum; reset it to keep counting")]
    TapCountOverflow {
        /// The UID that was tapped.
        uid: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Reader Errors ===
    /// The PC/SC layer failed.
    #[error("reader error: {0}")]
    Reader(#[from] rfid_checkin_pcsc::smart_card::Error),

    /// A UID could not be parsed or has an unsupported length.
    #[error("invalid UID: {0}")]
    InvalidUid(#[from] rfid_checkin_core::Error),

    // === I/O Errors ===
    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for check-in operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an unknown user error.
    #[must_use]
    pub fn unknown_user(uid: impl ToString) -> Self {
        Self::UnknownUser {
            uid: uid.to_string(),
        }
    }
}
