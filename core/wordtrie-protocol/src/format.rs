//! Byte layout of the compiled dictionary.
//!
//! The dictionary has no header. Offset 0 holds the root sibling group:
//!
//! ```text
//! group  := count:u8 node{count}
//! node   := char field [freq:u8 if terminal]
//! char   := u8 (value <= 254) | 0xFF hi:u8 lo:u8
//! field  := u8                      (no children)
//!         | u8 u8 u8                (children; 24-bit big-endian)
//! ```
//!
//! The 24-bit field carries two flags in its top bits and the offset of the
//! child group's count byte in the low 22 bits.

use bitflags::bitflags;

/// Hard ceiling of a compiled dictionary. Also the size of the 22-bit window.
pub const MAX_DICTIONARY_SIZE: usize = 4 * 1024 * 1024;

/// Low 22 bits of the address field.
pub const ADDRESS_MASK: u32 = 0x3F_FFFF;

/// First byte of a wide character.
pub const CHAR_ESCAPE: u8 = 0xFF;

/// Largest character value stored in a single byte.
pub const MAX_NARROW_CHAR: u16 = 254;

pub const MAX_FREQUENCY: u8 = u8::MAX;

/// Largest sibling group the count byte can describe.
pub const MAX_GROUP_LEN: usize = u8::MAX as usize;

/// Worst-case size of one node record: wide char, 3-byte field, frequency.
pub const MAX_NODE_LEN: usize = 7;

pub const COUNT_LEN: usize = 1;

/// Width of the field reserved for a node with children.
pub const WIDE_FIELD_LEN: usize = 3;

/// Width of the field reserved for a leaf.
pub const NARROW_FIELD_LEN: usize = 1;

bitflags! {
    /// Flag bits of the 24-bit address field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u32 {
        /// Bit 22: the low bits hold a child group offset.
        const HAS_CHILDREN = 0x40_0000;
        /// Bit 23: a word ends at this node; a frequency byte follows the field.
        const TERMINAL = 0x80_0000;
    }
}

/// Packs a child group offset and the terminal flag into a field value.
///
/// The offset is masked to 22 bits. A masked offset of zero means "no
/// children" and leaves `HAS_CHILDREN` clear.
pub fn pack_field(child_offset: u32, terminal: bool) -> u32 {
    let address = child_offset & ADDRESS_MASK;
    let mut flags = FieldFlags::empty();
    if address != 0 {
        flags |= FieldFlags::HAS_CHILDREN;
    }
    if terminal {
        flags |= FieldFlags::TERMINAL;
    }
    flags.bits() | address
}

/// Saturates an occurrence count into the frequency byte.
pub fn clamp_frequency(occurrence: u32) -> u8 {
    u8::try_from(occurrence).unwrap_or(MAX_FREQUENCY)
}

/// Encoded character of a node record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharField {
    bytes: [u8; 3],
    len: u8,
}

impl CharField {
    pub fn encode(unit: u16) -> Self {
        if unit <= MAX_NARROW_CHAR {
            Self { bytes: [unit as u8, 0, 0], len: 1 }
        } else {
            let [hi, lo] = unit.to_be_bytes();
            Self { bytes: [CHAR_ESCAPE, hi, lo], len: 3 }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_wide(&self) -> bool {
        self.len > 1
    }
}
