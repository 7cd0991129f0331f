mod card;
mod context;
mod error;
mod reader;

pub use card::SmartCard;
pub use context::SmartCardContext;
pub use error::Error;
pub use reader::SmartCardReader;
