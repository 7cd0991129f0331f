use core::{fmt, str::FromStr};

use heapless::Vec;

use crate::Error;

/// Longest UID defined by ISO/IEC 14443-3 (triple size).
pub const MAX_UID_LEN: usize = 10;

/// Unique identifier of an RFID tag.
///
/// Only the single (4 byte), double (7 byte) and triple (10 byte) sizes are valid.
/// Formats as uppercase hex without separators, e.g. `04A21F0B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uid(Vec<u8, MAX_UID_LEN>);

impl Uid {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<&[u8]> for Uid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match bytes.len() {
            4 | 7 | 10 => Vec::from_slice(bytes)
                .map(Uid)
                .map_err(|_| Error::InvalidUidLength(bytes.len())),
            len => Err(Error::InvalidUidLength(len)),
        }
    }
}

impl<const N: usize> TryFrom<[u8; N]> for Uid {
    type Error = Error;

    fn try_from(bytes: [u8; N]) -> Result<Self, Self::Error> {
        Uid::try_from(&bytes[..])
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// Parses a hex UID in either case, e.g. `04a21f0b` or `04A21F0B`.
impl FromStr for Uid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().as_bytes();
        if digits.len() % 2 != 0 {
            return Err(Error::InvalidHex);
        }

        let mut bytes: Vec<u8, MAX_UID_LEN> = Vec::new();
        for pair in digits.chunks(2) {
            let byte = (hex_digit(pair[0])? << 4) | hex_digit(pair[1])?;
            bytes
                .push(byte)
                .map_err(|_| Error::InvalidUidLength(digits.len() / 2))?;
        }

        Uid::try_from(bytes.as_slice())
    }
}

fn hex_digit(c: u8) -> Result<u8, Error> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(Error::InvalidHex),
    }
}
