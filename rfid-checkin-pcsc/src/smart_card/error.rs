use std::fmt;

use rfid_checkin_core::Error as UidError;

#[derive(Debug)]
pub enum Error {
    ContextInitFailed(String),
    ReaderListFailed(String),
    ReaderNotFound(String),
    NoCardPresent,
    /// Another PC/SC client reset the card; the handle must be reconnected.
    CardReset,
    CardConnectFailed(String),
    CardCommunicateFailed(String),
    InvalidUid(UidError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ContextInitFailed(msg) => {
                write!(f, "Context initialization failed: {}", msg)
            }
            Error::ReaderListFailed(msg) => write!(f, "Reader list failed: {}", msg),
            Error::ReaderNotFound(msg) => write!(f, "No matching reader: {}", msg),
            Error::NoCardPresent => write!(f, "Smart card not present in the reader"),
            Error::CardReset => write!(f, "Smart card was reset by another application"),
            Error::CardConnectFailed(msg) => write!(f, "Card connect failed: {}", msg),
            Error::CardCommunicateFailed(msg) => {
                write!(f, "Communication with card failed: {}", msg)
            }
            Error::InvalidUid(err) => write!(f, "Card returned an invalid UID: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidUid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UidError> for Error {
    fn from(err: UidError) -> Self {
        Error::InvalidUid(err)
    }
}
