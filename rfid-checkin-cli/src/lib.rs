//! `rfid-checkin` - RFID tap check-in/check-out station
//!
//! Polls a PC/SC reader for tags and keeps a per-UID record of tap counts and
//! last scan times. Every tap alternates its holder between checked in and
//! checked out.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod checkin;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;

pub use checkin::{process_tap, Station, TapOutcome};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::{Storage, StorageStats, User};
