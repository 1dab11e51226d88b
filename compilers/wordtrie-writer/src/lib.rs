pub mod config;
pub mod error;
pub mod writer;

#[cfg(test)]
mod test_utils;

pub use config::WriterConfig;
pub use error::{ConfigError, WriteError};
pub use writer::{serialize, Dictionary, Truncation, WriteStats};
