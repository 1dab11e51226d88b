use std::collections::BTreeMap;

use wordtrie_protocol::{FieldFlags, CHAR_ESCAPE};

const HAS_CHILDREN: u8 = (FieldFlags::HAS_CHILDREN.bits() >> 16) as u8;
const TERMINAL: u8 = (FieldFlags::TERMINAL.bits() >> 16) as u8;

/// Reads a compiled dictionary back into (word, frequency) pairs.
///
/// Fails on any offset that runs past the buffer, so a successful decode
/// means every child address landed on a well-formed group.
pub fn decode(bytes: &[u8]) -> Result<BTreeMap<String, u8>, String> {
    let mut words = BTreeMap::new();
    if !bytes.is_empty() {
        decode_group(bytes, 0, &mut Vec::new(), &mut words)?;
    }
    Ok(words)
}

struct Record {
    unit: u16,
    child: Option<usize>,
    frequency: Option<u8>,
}

fn byte_at(bytes: &[u8], at: usize) -> Result<u8, String> {
    bytes.get(at).copied().ok_or_else(|| format!("read past the end at offset {}", at))
}

fn decode_group(
    bytes: &[u8],
    offset: usize,
    prefix: &mut Vec<u16>,
    words: &mut BTreeMap<String, u8>,
) -> Result<(), String> {
    let count = byte_at(bytes, offset)?;
    let mut at = offset + 1;

    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let first = byte_at(bytes, at)?;
        let unit = if first == CHAR_ESCAPE {
            let unit = u16::from_be_bytes([byte_at(bytes, at + 1)?, byte_at(bytes, at + 2)?]);
            at += 3;
            unit
        } else {
            at += 1;
            u16::from(first)
        };

        let flags = byte_at(bytes, at)?;
        let child = if flags & HAS_CHILDREN != 0 {
            let address = (usize::from(flags & 0x3F) << 16)
                | (usize::from(byte_at(bytes, at + 1)?) << 8)
                | usize::from(byte_at(bytes, at + 2)?);
            at += 3;
            Some(address)
        } else {
            at += 1;
            None
        };

        let frequency = if flags & TERMINAL != 0 {
            let frequency = byte_at(bytes, at)?;
            at += 1;
            Some(frequency)
        } else {
            None
        };

        records.push(Record { unit, child, frequency });
    }

    for record in records {
        prefix.push(record.unit);
        if let Some(frequency) = record.frequency {
            words.insert(String::from_utf16_lossy(prefix), frequency);
        }
        if let Some(child) = record.child {
            if child <= offset {
                return Err(format!("child address {} does not point forward from {}", child, offset));
            }
            decode_group(bytes, child, prefix, words)?;
        }
        prefix.pop();
    }
    Ok(())
}
