use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// One record of a frequency word list.
///
/// `frequency` is the relative (already normalized) value that ends up in
/// the dictionary. `absolute` is the raw corpus count, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct WordEntry {
    pub word: String,
    pub frequency: u32,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub absolute: Option<u64>,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, frequency: u32) -> Self {
        Self { word: word.into(), frequency, absolute: None }
    }

    pub fn with_absolute(mut self, absolute: u64) -> Self {
        self.absolute = Some(absolute);
        self
    }
}
