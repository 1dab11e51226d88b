use tracing::{debug, warn};
use wordtrie_builder::Trie;
use wordtrie_protocol::{
    pack_field, CharField, FieldFlags, NodeId, COUNT_LEN, MAX_GROUP_LEN, MAX_NODE_LEN,
    NARROW_FIELD_LEN, WIDE_FIELD_LEN,
};

use crate::config::WriterConfig;
use crate::error::WriteError;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Counters of one serialization pass. Not part of the binary format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct WriteStats {
    pub bytes_written: usize,
    /// Nodes whose address field was backfilled.
    pub nodes_written: usize,
    /// Terminal nodes backfilled, i.e. words the output can produce.
    pub words_written: usize,
    /// Nodes whose child address collapsed to "no children".
    pub null_children: usize,
    pub non_terminal: usize,
}

/// Why and where a pass stopped short of the full trie.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Truncation {
    /// Words present in the partial output.
    pub words_written: usize,
    /// Path of the node whose record did not fit.
    pub last_word: String,
    pub last_frequency: u8,
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_display"))]
    pub error: WriteError,
}

#[cfg(feature = "serde")]
fn serialize_display<S: serde::Serializer>(error: &WriteError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// A compiled dictionary. `bytes` is exactly the valid output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    bytes: Vec<u8>,
    stats: WriteStats,
    truncation: Option<Truncation>,
}

impl Dictionary {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn stats(&self) -> &WriteStats {
        &self.stats
    }

    /// Set when the capacity ceiling cut the pass short.
    pub fn truncation(&self) -> Option<&Truncation> {
        self.truncation.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.truncation.is_none()
    }
}

/// Serializes `trie` into the binary dictionary format.
///
/// Running out of capacity is not an error: the pass stops, the bytes
/// written so far are patched into a decodable dictionary and the returned
/// value carries a [`Truncation`].
pub fn serialize(trie: &Trie, config: &WriterConfig) -> Dictionary {
    DictionaryWriter::new(trie, config).run()
}

/// Owns the output buffer and its cursor for one pass.
struct DictionaryWriter<'t> {
    trie: &'t Trie,
    buf: Vec<u8>,
    cursor: usize,
    capacity: usize,
    stats: WriteStats,
    /// Characters from the root down to the group being written.
    path: Vec<u16>,
    /// Node whose record hit the ceiling, with its full path.
    failed: Option<(Vec<u16>, u8)>,
    /// Empty group left where a group's records did not fit.
    empty_group: Option<usize>,
}

impl<'t> DictionaryWriter<'t> {
    fn new(trie: &'t Trie, config: &WriterConfig) -> Self {
        Self {
            trie,
            buf: vec![0; config.capacity()],
            cursor: 0,
            capacity: config.capacity(),
            stats: WriteStats::default(),
            path: Vec::new(),
            failed: None,
            empty_group: None,
        }
    }

    fn run(mut self) -> Dictionary {
        let roots = self.trie.roots();
        let truncation = match self.write_group(roots) {
            Ok(()) => None,
            Err(error) => {
                let (units, last_frequency) = self.failed.take().unwrap_or_default();
                let last_word = String::from_utf16_lossy(&units);
                warn!(
                    words_written = self.stats.words_written,
                    last_word = %last_word,
                    last_frequency,
                    %error,
                    "could not write all the words, dictionary is partial"
                );
                Some(Truncation {
                    words_written: self.stats.words_written,
                    last_word,
                    last_frequency,
                    error,
                })
            }
        };

        self.buf.truncate(self.cursor);
        self.buf.shrink_to_fit();
        self.stats.bytes_written = self.cursor;
        debug!(
            size = self.stats.bytes_written,
            nodes = self.stats.nodes_written,
            null_children = self.stats.null_children,
            non_terminal = self.stats.non_terminal,
            "dictionary written"
        );

        Dictionary { bytes: self.buf, stats: self.stats, truncation }
    }

    fn capacity_exceeded(&self, offset: usize, needed: usize) -> WriteError {
        WriteError::CapacityExceeded { offset, needed, capacity: self.capacity }
    }

    /// Writes one sibling group and, after it, the subtrees of its nodes.
    ///
    /// Every record of the group is written first with its address field
    /// zeroed. Each field is backfilled once the node's child group has been
    /// written and its offset is known.
    fn write_group(&mut self, group: &[NodeId]) -> Result<(), WriteError> {
        if group.is_empty() {
            return Ok(());
        }

        let start = self.cursor;
        self.push_count(group.len())?;

        let mut reserved = Vec::with_capacity(group.len());
        for (k, &id) in group.iter().enumerate() {
            let offset = self.cursor;
            if let Err(error) = self.push_node(id) {
                let node = self.trie.node(id);
                let mut word = self.path.clone();
                word.push(node.character());
                self.failed = Some((word, node.frequency()));
                self.close_partial_group(start, &group[..k], &reserved)?;
                return Err(error);
            }
            reserved.push(offset);
        }

        for (j, (&id, &offset)) in group.iter().zip(&reserved).enumerate() {
            let node = self.trie.node(id);
            let child_start = self.cursor;

            self.path.push(node.character());
            let written = self.write_group(node.children());
            self.path.pop();

            let child_offset = if node.has_children() { child_start } else { 0 };
            self.backfill(offset, id, child_offset)?;

            if let Err(error) = written {
                // A record always leaves room for the next count byte, so the
                // failing group has left its empty marker
                let empty = self.empty_group.unwrap_or(0);
                for (&sibling, &offset) in group[j + 1..].iter().zip(&reserved[j + 1..]) {
                    let target = if self.trie.node(sibling).has_children() { empty } else { 0 };
                    self.backfill(offset, sibling, target)?;
                }
                return Err(error);
            }
        }

        Ok(())
    }

    /// Shrinks a group whose records stopped fitting to the records already
    /// written and leaves an empty group for their subtrees to point at.
    ///
    /// Each record leaves at least one free byte, so the empty group always
    /// fits. With no record written the group itself becomes the empty one.
    fn close_partial_group(
        &mut self,
        start: usize,
        written: &[NodeId],
        reserved: &[usize],
    ) -> Result<(), WriteError> {
        if written.is_empty() {
            self.buf[start] = 0;
            self.cursor = start + COUNT_LEN;
            self.empty_group = Some(start);
            return Ok(());
        }

        self.buf[start] = written.len() as u8;
        let empty = self.cursor;
        self.buf[empty] = 0;
        self.cursor += COUNT_LEN;
        self.empty_group = Some(empty);

        for (&id, &offset) in written.iter().zip(reserved) {
            let target = if self.trie.node(id).has_children() { empty } else { 0 };
            self.backfill(offset, id, target)?;
        }
        Ok(())
    }

    fn push_count(&mut self, count: usize) -> Result<(), WriteError> {
        if self.cursor >= self.capacity {
            return Err(self.capacity_exceeded(self.cursor, COUNT_LEN));
        }
        if count > MAX_GROUP_LEN {
            warn!(count, offset = self.cursor, "sibling group too large for its count byte");
        }
        self.buf[self.cursor] = count as u8;
        self.cursor += COUNT_LEN;
        Ok(())
    }

    /// Writes the character, reserves the address field and writes the
    /// frequency byte of a terminal node.
    fn push_node(&mut self, id: NodeId) -> Result<(), WriteError> {
        if self.cursor + MAX_NODE_LEN >= self.capacity {
            return Err(self.capacity_exceeded(self.cursor, MAX_NODE_LEN));
        }

        let node = self.trie.node(id);
        let field = CharField::encode(node.character());
        self.buf[self.cursor..self.cursor + field.len()].copy_from_slice(field.as_bytes());
        self.cursor += field.len();

        self.cursor += if node.has_children() { WIDE_FIELD_LEN } else { NARROW_FIELD_LEN };

        if node.is_terminal() {
            self.buf[self.cursor] = node.frequency();
            self.cursor += 1;
        }
        Ok(())
    }

    /// Fills the address field of the record at `offset`.
    ///
    /// Only the flag byte is written when the masked address is zero.
    fn backfill(&mut self, offset: usize, id: NodeId, child_offset: usize) -> Result<(), WriteError> {
        if offset + WIDE_FIELD_LEN >= self.capacity {
            return Err(self.capacity_exceeded(offset, WIDE_FIELD_LEN));
        }

        let node = self.trie.node(id);
        let at = offset + CharField::encode(node.character()).len();
        let value = pack_field(child_offset as u32, node.is_terminal());
        let flags = FieldFlags::from_bits_truncate(value);

        self.stats.nodes_written += 1;
        if !flags.contains(FieldFlags::HAS_CHILDREN) {
            self.stats.null_children += 1;
        }
        if node.is_terminal() {
            self.stats.words_written += 1;
        } else {
            self.stats.non_terminal += 1;
        }

        let [_, high, mid, low] = value.to_be_bytes();
        self.buf[at] = high;
        if flags.contains(FieldFlags::HAS_CHILDREN) {
            self.buf[at + 1] = mid;
            self.buf[at + 2] = low;
        }
        Ok(())
    }
}
