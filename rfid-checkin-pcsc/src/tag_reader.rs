use rfid_checkin_core::{TagReader, Uid};
use tracing::{debug, info, warn};

use crate::acr122u::{self, Acr122uCard};
use crate::smart_card::{Error, SmartCard, SmartCardContext, SmartCardReader};

/// Reader feedback settings, only honoured by ACR122U readers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Keep the buzzer sounding when a card enters the field.
    pub beep_on_detect: bool,
    /// Flash the LED once a tap has been recorded.
    pub blink_on_tap: bool,
}

impl Default for Feedback {
    fn default() -> Self {
        Feedback {
            beep_on_detect: true,
            blink_on_tap: true,
        }
    }
}

/// Tracks which tag is in the field so each presentation is reported once.
///
/// Only an observed empty field clears the tag; failed reads and reconnects leave it in
/// place, so the same tag read again after an error is not a new arrival.
#[derive(Debug, Default)]
struct Presence {
    current: Option<Uid>,
}

impl Presence {
    /// Applies one field read. A failed read is passed through and changes nothing.
    fn track(&mut self, read: Result<Option<Uid>, Error>) -> Result<Option<Uid>, Error> {
        let seen = read?;
        Ok(self.observe(seen))
    }

    /// Records what the field holds now, returning the UID if it just arrived.
    fn observe(&mut self, seen: Option<Uid>) -> Option<Uid> {
        match seen {
            Some(uid) if self.current.as_ref() == Some(&uid) => None,
            Some(uid) => {
                self.current = Some(uid.clone());
                Some(uid)
            }
            None => {
                self.current = None;
                None
            }
        }
    }
}

/// Polls a single PC/SC reader for newly presented tags.
///
/// The card stays connected while it remains in the field so it is reported once per
/// presentation. Removing it and presenting it again counts as a new tap.
pub struct PcscTagReader {
    context: SmartCardContext,
    reader_name: String,
    card: Option<SmartCard>,
    presence: Presence,
    feedback: Feedback,
    beep_configured: bool,
}

impl PcscTagReader {
    /// Establishes a PC/SC context and binds to the first reader matching `name_prefix`.
    pub fn open(name_prefix: Option<&str>, feedback: Feedback) -> Result<Self, Error> {
        let context = SmartCardContext::establish()?;
        let reader_name = context.select_reader(name_prefix)?.name;
        info!(reader = %reader_name, "Using reader");

        Ok(PcscTagReader {
            context,
            reader_name,
            card: None,
            presence: Presence::default(),
            feedback,
            beep_configured: false,
        })
    }

    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    fn reader(&self) -> SmartCardReader<'_> {
        SmartCardReader::new(self.reader_name.clone(), &self.context)
    }

    fn configure_beep(&mut self, card: &mut SmartCard) {
        if self.beep_configured || !acr122u::is_acr122u(&self.reader_name) {
            return;
        }
        // The setting is held by the reader until it is power cycled.
        match Acr122uCard::new(card).set_card_detect_beep(self.feedback.beep_on_detect) {
            Ok(()) => debug!(beep = self.feedback.beep_on_detect, "Configured card detect beep"),
            Err(err) => warn!("Failed to configure card detect beep: {}", err),
        }
        self.beep_configured = true;
    }

    /// Reads the UID in the field, reusing the held card or connecting a new one.
    ///
    /// `Ok(None)` means the field is empty.
    fn read_field(&mut self) -> Result<Option<Uid>, Error> {
        if let Some(card) = self.card.as_mut() {
            match card.get_uid() {
                Ok(uid) => return Ok(Some(uid)),
                Err(Error::NoCardPresent) => {
                    debug!(reader = %self.reader_name, "Card removed");
                    self.card = None;
                    return Ok(None);
                }
                Err(Error::CardReset) => {
                    debug!(reader = %self.reader_name, "Card reset, reconnecting");
                    self.card = None;
                }
                Err(err) => {
                    self.card = None;
                    return Err(err);
                }
            }
        }

        let mut card = match self.reader().connect_to_card() {
            Ok(card) => card,
            Err(Error::NoCardPresent) => return Ok(None),
            Err(err) => return Err(err),
        };

        self.configure_beep(&mut card);
        let uid = match card.get_uid() {
            Ok(uid) => uid,
            Err(Error::NoCardPresent) => return Ok(None),
            Err(err) => return Err(err),
        };
        self.card = Some(card);

        Ok(Some(uid))
    }
}

impl TagReader for PcscTagReader {
    type Error = Error;

    fn poll(&mut self) -> Result<Option<Uid>, Self::Error> {
        let read = self.read_field();
        let arrived = self.presence.track(read)?;
        if let Some(uid) = &arrived {
            debug!(reader = %self.reader_name, %uid, "Card presented");
        }
        Ok(arrived)
    }

    fn acknowledge(&mut self) -> Result<(), Self::Error> {
        if !self.feedback.blink_on_tap || !acr122u::is_acr122u(&self.reader_name) {
            return Ok(());
        }
        match self.card.as_mut() {
            Some(card) => Acr122uCard::new(card).blink(),
            None => Ok(()),
        }
    }
}
