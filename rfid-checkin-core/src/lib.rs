#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod greeting;
pub mod reader;
pub mod uid;

pub use error::Error;
pub use greeting::Greeting;
pub use reader::TagReader;
pub use uid::Uid;
