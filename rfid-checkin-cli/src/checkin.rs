//! The tap loop: read a tag, look it up, register or greet, repeat.

use std::fmt;
use std::io::Write;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rfid_checkin_core::{Greeting, TagReader, Uid};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::storage::Storage;

/// What a single tap did to the user's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// First time this UID was seen; a row was inserted with a tap count of 1.
    Registered {
        /// Tag UID as uppercase hex.
        uid: String,
    },
    /// Known UID; the tap count was incremented.
    Greeted {
        /// Tag UID as uppercase hex.
        uid: String,
        /// Username assigned by an administrator, if any.
        username: Option<String>,
        /// Tap count after this tap.
        tap_count: u32,
        /// Greeting picked from the parity of `tap_count`.
        greeting: Greeting,
    },
}

impl fmt::Display for TapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapOutcome::Registered { .. } => write!(f, "UID inserted into database."),
            TapOutcome::Greeted {
                uid,
                username,
                greeting,
                ..
            } => write!(f, "{} {}", greeting, username.as_deref().unwrap_or(uid)),
        }
    }
}

/// Record one tap of `uid` at time `now`.
///
/// The lookup and the insert or update run in one transaction.
///
/// # Errors
///
/// Returns an error if any database statement fails, or
/// [`Error::TapCountOverflow`] if the tag's count cannot grow any further.
/// Nothing is written in either case.
pub fn process_tap(storage: &Storage, uid: &Uid, now: DateTime<Utc>) -> Result<TapOutcome> {
    storage.in_transaction(|storage| match storage.find_user(uid)? {
        Some(user) => {
            let tap_count = user
                .tap_count
                .checked_add(1)
                .ok_or_else(|| Error::TapCountOverflow { uid: user.uid.clone() })?;
            storage.record_tap(uid, tap_count, now)?;
            Ok(TapOutcome::Greeted {
                uid: user.uid,
                username: user.username,
                tap_count,
                greeting: Greeting::for_tap_count(tap_count),
            })
        }
        None => {
            storage.register(uid, now)?;
            Ok(TapOutcome::Registered {
                uid: uid.to_string(),
            })
        }
    })
}

/// A reader bound to a database, polling until stopped.
pub struct Station<'s, R> {
    reader: R,
    storage: &'s Storage,
    poll_interval: Duration,
    tap_cooldown: Duration,
}

impl<R> fmt::Debug for Station<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Station")
            .field("storage", &self.storage.path())
            .field("poll_interval", &self.poll_interval)
            .field("tap_cooldown", &self.tap_cooldown)
            .finish_non_exhaustive()
    }
}

impl<'s, R> Station<'s, R>
where
    R: TagReader,
    R::Error: fmt::Display,
{
    pub fn new(reader: R, storage: &'s Storage) -> Self {
        Self {
            reader,
            storage,
            poll_interval: Duration::from_millis(100),
            tap_cooldown: Duration::from_secs(1),
        }
    }

    /// Delay between polls while no new tag is present.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Delay after each processed tap.
    #[must_use]
    pub fn with_tap_cooldown(mut self, tap_cooldown: Duration) -> Self {
        self.tap_cooldown = tap_cooldown;
        self
    }

    /// Poll the reader and record taps, writing the transcript to `out`.
    ///
    /// Runs forever when `limit` is `None`, otherwise stops after `limit` taps.
    /// Reader and database failures are logged and the loop carries on.
    /// Returns the number of taps seen.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to `out` fails.
    pub fn run<W: Write>(&mut self, out: &mut W, limit: Option<usize>) -> Result<usize> {
        let mut taps = 0;
        info!("Waiting for tags");

        while limit.map_or(true, |limit| taps < limit) {
            let uid = match self.reader.poll() {
                Ok(Some(uid)) => uid,
                Ok(None) => {
                    thread::sleep(self.poll_interval);
                    continue;
                }
                Err(err) => {
                    warn!("Failed to read tag: {}", err);
                    thread::sleep(self.poll_interval);
                    continue;
                }
            };

            writeln!(out, "UID: {uid}")?;
            match process_tap(self.storage, &uid, Utc::now()) {
                Ok(outcome) => {
                    debug!(%uid, ?outcome, "Tap recorded");
                    writeln!(out, "{outcome}")?;
                    if let Err(err) = self.reader.acknowledge() {
                        warn!("Failed to acknowledge tap: {}", err);
                    }
                }
                Err(err) => error!(%uid, "Database error: {}", err),
            }
            out.flush()?;

            taps += 1;
            thread::sleep(self.tap_cooldown);
        }

        Ok(taps)
    }
}
