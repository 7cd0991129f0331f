//! `SQLite` schema definitions.

/// SQL statement to create the users table, one row per tag UID.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    uid TEXT PRIMARY KEY NOT NULL,
    username TEXT,
    tap_count INTEGER NOT NULL DEFAULT 0,
    last_scan_time TEXT
)
";

/// SQL statement to create an index on `last_scan_time` for listing recent taps.
pub const CREATE_LAST_SCAN_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_users_last_scan ON users(last_scan_time DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_LAST_SCAN_INDEX,
    CREATE_METADATA_TABLE,
];
