pub mod acr122u;
pub mod smart_card;
mod tag_reader;

pub use tag_reader::{Feedback, PcscTagReader};
