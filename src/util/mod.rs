pub mod checksum;
mod result;

pub use result::{Error, Result};
