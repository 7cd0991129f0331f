//! Storage layer for the check-in station.
//!
//! One `SQLite` row per tag UID holds the tap count, the time of the last
//! tap and an optional username set by an administrator.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rfid_checkin_core::Uid;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// A registered tag and its tap history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Tag UID as uppercase hex.
    pub uid: String,
    /// Name assigned by an administrator, if any.
    pub username: Option<String>,
    /// Number of taps recorded for this tag.
    pub tap_count: u32,
    /// Time of the most recent tap.
    pub last_scan_time: Option<DateTime<Utc>>,
}

impl User {
    /// An odd tap count means the last tap was a check-in.
    #[must_use]
    pub fn is_checked_in(&self) -> bool {
        self.tap_count % 2 == 1
    }

}

/// Aggregate figures over all users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of registered tags.
    pub users: u64,
    /// Sum of all tap counts.
    pub total_taps: u64,
    /// Users whose last tap was a check-in.
    pub checked_in: u64,
}

/// Persistent user records backed by a single `SQLite` connection.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` inside a transaction, committing only if it succeeds.
    ///
    /// The write lock is taken up front, so a write from another connection
    /// waits on the busy timeout instead of invalidating reads made by `f`.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, or an error if the transaction cannot be
    /// started or committed.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    /// Look up the row for a UID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_user(&self, uid: &Uid) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                r"
                SELECT uid, username, tap_count, last_scan_time
                FROM users WHERE uid = ?1
                ",
                [uid.to_string()],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Insert a first-time tag with a tap count of 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// UID is already registered.
    pub fn register(&self, uid: &Uid, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (uid, tap_count, last_scan_time) VALUES (?1, 1, ?2)",
            params![uid.to_string(), now],
        )?;
        debug!(%uid, "Registered new tag");
        Ok(())
    }

    /// Store a new tap count and scan time for an existing tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUser`] if the UID has no row, or an error if the
    /// database operation fails.
    pub fn record_tap(&self, uid: &Uid, tap_count: u32, now: DateTime<Utc>) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE users SET tap_count = ?1, last_scan_time = ?2 WHERE uid = ?3",
            params![tap_count, now, uid.to_string()],
        )?;
        Self::expect_one(updated, uid)
    }

    /// Pre-register a tag under a username, before its first tap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserExists`] if the UID is already registered, or an
    /// error if the database operation fails.
    pub fn add_user(&self, uid: &Uid, username: &str) -> Result<()> {
        self.in_transaction(|storage| {
            if storage.find_user(uid)?.is_some() {
                return Err(Error::UserExists {
                    uid: uid.to_string(),
                });
            }
            storage.conn.execute(
                "INSERT INTO users (uid, username, tap_count) VALUES (?1, ?2, 0)",
                params![uid.to_string(), username],
            )?;
            Ok(())
        })
    }

    /// Get all users, most recently seen first. Never-seen users come last.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT uid, username, tap_count, last_scan_time
            FROM users
            ORDER BY last_scan_time IS NULL, last_scan_time DESC, uid
            ",
        )?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Assign a username to a tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUser`] if the UID has no row, or an error if the
    /// database operation fails.
    pub fn set_username(&self, uid: &Uid, username: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE users SET username = ?1 WHERE uid = ?2",
            params![username, uid.to_string()],
        )?;
        Self::expect_one(updated, uid)
    }

    /// Delete a tag and its history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUser`] if the UID has no row, or an error if the
    /// database operation fails.
    pub fn remove_user(&self, uid: &Uid) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE uid = ?1", [uid.to_string()])?;
        Self::expect_one(deleted, uid)
    }

    /// Set a tag's tap count back to zero so its next tap checks in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownUser`] if the UID has no row, or an error if the
    /// database operation fails.
    pub fn reset_taps(&self, uid: &Uid) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE users SET tap_count = 0 WHERE uid = ?1",
            [uid.to_string()],
        )?;
        Self::expect_one(updated, uid)
    }

    /// Get aggregate figures over all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let (users, total_taps, checked_in): (i64, i64, i64) = self.conn.query_row(
            r"
            SELECT COUNT(*), COALESCE(SUM(tap_count), 0), COALESCE(SUM(tap_count % 2), 0)
            FROM users
            ",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(StorageStats {
            users: u64::try_from(users).unwrap_or_default(),
            total_taps: u64::try_from(total_taps).unwrap_or_default(),
            checked_in: u64::try_from(checked_in).unwrap_or_default(),
        })
    }

    fn expect_one(changed: usize, uid: &Uid) -> Result<()> {
        if changed == 0 {
            Err(Error::unknown_user(uid))
        } else {
            Ok(())
        }
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            uid: row.get(0)?,
            username: row.get(1)?,
            tap_count: row.get(2)?,
            last_scan_time: row.get(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::thread;

    fn uid(hex: &str) -> Uid {
        hex.parse().unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.path(), Path::new(":memory:"));
        assert!(storage.list_users().unwrap().is_empty());
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("checkin.db");

        let storage = Storage::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(storage.path(), path.as_path());
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkin.db");
        let tag = uid("04A21F0B");

        {
            let storage = Storage::open(&path).unwrap();
            storage.register(&tag, at(9)).unwrap();
        }

        let storage = Storage::open(&path).unwrap();
        let user = storage.find_user(&tag).unwrap().unwrap();
        assert_eq!(user.tap_count, 1);
    }

    #[test]
    fn test_find_missing_user() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(storage.find_user(&uid("DEADBEEF")).unwrap().is_none());
    }

    #[test]
    fn test_register_sets_first_tap() {
        let storage = Storage::open_in_memory().unwrap();
        let tag = uid("04A21F0B");
        storage.register(&tag, at(9)).unwrap();

        let user = storage.find_user(&tag).unwrap().unwrap();
        assert_eq!(user.uid, "04A21F0B");
        assert_eq!(user.username, None);
        assert_eq!(user.tap_count, 1);
        assert_eq!(user.last_scan_time, Some(at(9)));
        assert!(user.is_checked_in());
    }

    #[test]
    fn test_register_twice_fails() {
        let storage = Storage::open_in_memory().unwrap();
        let tag = uid("04A21F0B");
        storage.register(&tag, at(9)).unwrap();
        assert!(matches!(
            storage.register(&tag, at(10)),
            Err(Error::Database(_))
        ));
    }

    #[test]
    fn test_record_tap_updates_count_and_time() {
        let storage = Storage::open_in_memory().unwrap();
        let tag = uid("04A21F0B");
        storage.register(&tag, at(9)).unwrap();
        storage.record_tap(&tag, 2, at(17)).unwrap();

        let user = storage.find_user(&tag).unwrap().unwrap();
        assert_eq!(user.tap_count, 2);
        assert_eq!(user.last_scan_time, Some(at(17)));
        assert!(!user.is_checked_in());
    }

    #[test]
    fn test_record_tap_unknown_user() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(matches!(
            storage.record_tap(&uid("DEADBEEF"), 2, at(9)),
            Err(Error::UnknownUser { .. })
        ));
    }

    #[test]
    fn test_add_user_before_first_tap() {
        let storage = Storage::open_in_memory().unwrap();
        let tag = uid("045E3C8A012B80");
        storage.add_user(&tag, "alice").unwrap();

        let user = storage.find_user(&tag).unwrap().unwrap();
        assert_eq!(user.username.as_deref(), Some("alice"));
        assert_eq!(user.tap_count, 0);
        assert_eq!(user.last_scan_time, None);

        assert!(matches!(
            storage.add_user(&tag, "bob"),
            Err(Error::UserExists { .. })
        ));
    }

    #[test]
    fn test_set_username() {
        let storage = Storage::open_in_memory().unwrap();
        let tag = uid("04A21F0B");
        storage.register(&tag, at(9)).unwrap();
        storage.set_username(&tag, "carol").unwrap();

        let user = storage.find_user(&tag).unwrap().unwrap();
        assert_eq!(user.username.as_deref(), Some("carol"));
        assert!(storage.set_username(&uid("DEADBEEF"), "dave").is_err());
    }

    #[test]
    fn test_remove_user() {
        let storage = Storage::open_in_memory().unwrap();
        let tag = uid("04A21F0B");
        storage.register(&tag, at(9)).unwrap();
        storage.remove_user(&tag).unwrap();

        assert!(storage.find_user(&tag).unwrap().is_none());
        assert!(matches!(
            storage.remove_user(&tag),
            Err(Error::UnknownUser { .. })
        ));
    }

    #[test]
    fn test_reset_taps() {
        let storage = Storage::open_in_memory().unwrap();
        let tag = uid("04A21F0B");
        storage.register(&tag, at(9)).unwrap();
        storage.reset_taps(&tag).unwrap();

        let user = storage.find_user(&tag).unwrap().unwrap();
        assert_eq!(user.tap_count, 0);
        assert_eq!(user.last_scan_time, Some(at(9)));
    }

    #[test]
    fn test_list_users_most_recent_first() {
        let storage = Storage::open_in_memory().unwrap();
        storage.register(&uid("AAAAAAAA"), at(8)).unwrap();
        storage.register(&uid("BBBBBBBB"), at(12)).unwrap();
        storage.add_user(&uid("CCCCCCCC"), "never seen").unwrap();
        storage.register(&uid("DDDDDDDD"), at(10)).unwrap();

        let uids: Vec<String> = storage
            .list_users()
            .unwrap()
            .into_iter()
            .map(|user| user.uid)
            .collect();
        assert_eq!(uids, ["BBBBBBBB", "DDDDDDDD", "AAAAAAAA", "CCCCCCCC"]);
    }

    #[test]
    fn test_stats() {
        let storage = Storage::open_in_memory().unwrap();
        assert_eq!(storage.stats().unwrap(), StorageStats::default());

        let a = uid("AAAAAAAA");
        let b = uid("BBBBBBBB");
        storage.register(&a, at(8)).unwrap();
        storage.register(&b, at(8)).unwrap();
        storage.record_tap(&b, 2, at(9)).unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.users, 2);
        assert_eq!(stats.total_taps, 3);
        assert_eq!(stats.checked_in, 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let storage = Storage::open_in_memory().unwrap();
        let tag = uid("04A21F0B");

        let result: Result<()> = storage.in_transaction(|storage| {
            storage.register(&tag, at(9))?;
            Err(Error::unknown_user(&tag))
        });
        assert!(result.is_err());
        assert!(storage.find_user(&tag).unwrap().is_none());
    }

    #[test]
    fn test_timestamps_keep_subsecond_precision() {
        let storage = Storage::open_in_memory().unwrap();
        let tag = uid("04A21F0B");
        let now = at(9) + Duration::milliseconds(1234);
        storage.register(&tag, now).unwrap();

        let user = storage.find_user(&tag).unwrap().unwrap();
        assert_eq!(user.last_scan_time, Some(now));
    }

    #[test]
    fn test_admin_write_waits_for_open_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkin.db");
        let station = Storage::open(&path).unwrap();
        let admin = Storage::open(&path).unwrap();
        let tag = uid("04A21F0B");
        station.register(&tag, at(8)).unwrap();

        let rename = station
            .in_transaction(|storage| {
                let user = storage.find_user(&tag)?.unwrap();

                let admin_tag = tag.clone();
                let rename = thread::spawn(move || admin.set_username(&admin_tag, "alice"));
                thread::sleep(std::time::Duration::from_millis(50));

                storage.record_tap(&tag, user.tap_count + 1, at(9))?;
                Ok(rename)
            })
            .unwrap();
        rename.join().unwrap().unwrap();

        let user = station.find_user(&tag).unwrap().unwrap();
        assert_eq!(user.tap_count, 2);
        assert_eq!(user.last_scan_time, Some(at(9)));
        assert_eq!(user.username.as_deref(), Some("alice"));
    }
}
