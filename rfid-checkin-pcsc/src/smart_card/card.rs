use crate::smart_card::Error;
use pcsc::{Card, MAX_BUFFER_SIZE};
use rfid_checkin_core::Uid;

/// PC/SC part 3 "Get Data" pseudo APDU returning the UID of the card in the field.
const GET_UID_APDU: [u8; 5] = [0xFF, 0xCA, 0x00, 0x00, 0x00];

pub struct SmartCard {
    pcsc_card: Card,
}

impl SmartCard {
    pub(crate) fn new(pcsc_card: Card) -> Self {
        SmartCard { pcsc_card }
    }

    /// Reads the UID of the card through the reader.
    pub fn get_uid(&mut self) -> Result<Uid, Error> {
        let response = self.transmit_apdu(&GET_UID_APDU)?;
        parse_uid_response(&response)
    }

    pub fn transmit_apdu(&mut self, apdu: &[u8]) -> Result<Vec<u8>, Error> {
        let mut response_buff = [0u8; MAX_BUFFER_SIZE];
        let response = self
            .pcsc_card
            .transmit(apdu, &mut response_buff)
            .map_err(transmit_error)?;

        Ok(response.to_vec())
    }
}

fn transmit_error(err: pcsc::Error) -> Error {
    match err {
        pcsc::Error::RemovedCard | pcsc::Error::NoSmartcard => Error::NoCardPresent,
        pcsc::Error::ResetCard => Error::CardReset,
        err => Error::CardCommunicateFailed(format!("Failed to transceive card APDU: {}", err)),
    }
}

fn parse_uid_response(response: &[u8]) -> Result<Uid, Error> {
    match response {
        [uid @ .., 0x90, 0x00] => Ok(Uid::try_from(uid)?),
        [.., sw1, sw2] => Err(Error::CardCommunicateFailed(format!(
            "Unexpected response when reading UID SW1/SW2: {:02X} {:02X}",
            *sw1, *sw2
        ))),
        _ => Err(Error::CardCommunicateFailed(
            "Invalid response length when reading UID".to_string(),
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn uid_response_four_bytes() {
        let uid = parse_uid_response(&[0x04, 0xA2, 0x1F, 0x0B, 0x90, 0x00]).unwrap();
        assert_eq!(&[0x04, 0xA2, 0x1F, 0x0B], uid.as_bytes());
    }

    #[test]
    fn uid_response_seven_bytes() {
        let uid =
            parse_uid_response(&[0x04, 0x5E, 0x3C, 0x8A, 0x01, 0x2B, 0x80, 0x90, 0x00]).unwrap();
        assert_eq!("045E3C8A012B80", uid.to_string());
    }

    #[test]
    fn uid_response_error_status() {
        match parse_uid_response(&[0x63, 0x00]) {
            Err(Error::CardCommunicateFailed(msg)) => assert!(msg.contains("63 00")),
            other => panic!("Expected communication error, got {:?}", other.map(|u| u.to_string())),
        }
    }

    #[test]
    fn transmit_errors_distinguish_removal_and_reset() {
        assert!(matches!(transmit_error(pcsc::Error::RemovedCard), Error::NoCardPresent));
        assert!(matches!(transmit_error(pcsc::Error::NoSmartcard), Error::NoCardPresent));
        assert!(matches!(transmit_error(pcsc::Error::ResetCard), Error::CardReset));
        assert!(matches!(
            transmit_error(pcsc::Error::CommError),
            Error::CardCommunicateFailed(_)
        ));
    }

    #[test]
    fn uid_response_bad_length() {
        assert!(matches!(
            parse_uid_response(&[0x01, 0x02, 0x90, 0x00]),
            Err(Error::InvalidUid(rfid_checkin_core::Error::InvalidUidLength(2)))
        ));
        assert!(matches!(
            parse_uid_response(&[0x90]),
            Err(Error::CardCommunicateFailed(_))
        ));
        assert!(matches!(
            parse_uid_response(&[]),
            Err(Error::CardCommunicateFailed(_))
        ));
    }
}
