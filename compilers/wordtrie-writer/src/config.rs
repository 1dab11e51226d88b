use wordtrie_protocol::MAX_DICTIONARY_SIZE;

use crate::error::ConfigError;

/// Serializer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterConfig {
    capacity: usize,
}

impl WriterConfig {
    /// Lowers the output ceiling. It can never be raised past 4 MiB, the
    /// range of the 22-bit child addresses.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        if capacity > MAX_DICTIONARY_SIZE {
            return Err(ConfigError::CapacityTooLarge {
                requested: capacity,
                max: MAX_DICTIONARY_SIZE,
            });
        }
        Ok(Self { capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self { capacity: MAX_DICTIONARY_SIZE }
    }
}
