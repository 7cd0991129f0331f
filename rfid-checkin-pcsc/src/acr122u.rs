mod acr122u_card;

pub use acr122u_card::Acr122uCard;

/// Name prefix PC/SC reports for ACS ACR122U readers.
pub const READER_NAME_PREFIX: &str = "ACS ACR122";

/// Whether the named PC/SC reader is an ACR122U and understands its escape APDUs.
pub fn is_acr122u(reader_name: &str) -> bool {
    reader_name.starts_with(READER_NAME_PREFIX)
}
