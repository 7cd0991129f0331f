use crate::smart_card::{self, SmartCard};

/// ACR122U specific commands on top of a connected card.
pub struct Acr122uCard<'a> {
    smart_card: &'a mut SmartCard,
}

impl<'a> Acr122uCard<'a> {
    pub fn new(smart_card: &'a mut SmartCard) -> Self {
        Acr122uCard { smart_card }
    }

    /// Flashes the reader LED and sounds the buzzer once.
    pub fn blink(&mut self) -> Result<(), smart_card::Error> {
        let blink = b"\xFF\x00\x40\x50\x04\x05\x05\x03\x01";

        let response = self.smart_card.transmit_apdu(blink)?;

        match response.as_slice() {
            [0x90, _] => Ok(()),
            _ => Err(smart_card::Error::CardCommunicateFailed(format!(
                "Failed to blink reader LED, reader returned: {:02X?}",
                response
            ))),
        }
    }

    pub fn set_card_detect_beep(&mut self, beep: bool) -> Result<(), smart_card::Error> {
        let beep_byte = if beep { 0xFF } else { 0x00 };
        let beep_apdu = [0xFF, 0x00, 0x52, beep_byte, 0x00];

        let response = self.smart_card.transmit_apdu(&beep_apdu)?;

        match response.as_slice() {
            [0x90, b] if *b == beep_byte => Ok(()),
            _ => Err(smart_card::Error::CardCommunicateFailed(format!(
                "Failed to set card detect beep, reader returned: {:02X?}",
                response
            ))),
        }
    }
}
