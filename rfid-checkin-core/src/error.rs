use core::fmt;

/// Errors produced while handling tag identifiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// UID is not 4, 7 or 10 bytes long.
    InvalidUidLength(usize),

    /// UID text contains a non hex digit or an odd number of digits.
    InvalidHex,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidUidLength(len) => {
                write!(f, "Invalid UID length: {} bytes (expected 4, 7 or 10)", len)
            }
            Error::InvalidHex => write!(f, "UID is not a valid hex string"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
