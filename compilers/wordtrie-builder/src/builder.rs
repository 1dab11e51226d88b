use tracing::debug;
use wordtrie_protocol::{clamp_frequency, WordEntry};

use crate::trie::Trie;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Counters collected while the trie is populated. Diagnostics only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BuildStats {
    /// Trie nodes created.
    pub nodes: usize,
    pub words_added: usize,
    /// Words shorter than two UTF-16 units.
    pub words_ignored: usize,
    /// Occurrences above 255 that were clamped on input.
    pub clamped_occurrences: usize,
    /// Insertions whose root frequency saturated at 255.
    pub saturated_roots: usize,
    /// Last word that made it into the trie.
    pub last_entry: Option<WordEntry>,
}

/// Populates a [`Trie`] from (word, occurrence) pairs.
#[derive(Debug, Default)]
pub struct TrieBuilder {
    trie: Trie,
    stats: BuildStats,
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a trie from a sequence of pairs in one go.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let mut builder = Self::new();
        for (word, occurrence) in pairs {
            builder.insert(word.as_ref(), occurrence);
        }
        builder
    }

    /// Adds one word. Words shorter than two code units are skipped.
    ///
    /// Inserting the same word again never duplicates nodes: the terminal
    /// frequency takes the new occurrence and the root keeps accumulating.
    pub fn insert(&mut self, word: &str, occurrence: u32) {
        self.insert_with_absolute(word, occurrence, None);
    }

    /// Adds one word-list record, remembering its absolute frequency for
    /// the diagnostics.
    pub fn insert_entry(&mut self, entry: &WordEntry) {
        self.insert_with_absolute(&entry.word, entry.frequency, entry.absolute);
    }

    fn insert_with_absolute(&mut self, word: &str, occurrence: u32, absolute: Option<u64>) {
        let units: Vec<u16> = word.encode_utf16().collect();
        if units.len() <= 1 {
            self.stats.words_ignored += 1;
            return;
        }

        let frequency = clamp_frequency(occurrence);
        if u32::from(frequency) != occurrence {
            self.stats.clamped_occurrences += 1;
        }

        if let Some(insertion) = self.trie.add_word(&units, frequency) {
            if insertion.root_saturated {
                self.stats.saturated_roots += 1;
            }
            self.stats.words_added += 1;
            self.stats.nodes = self.trie.len();
            self.stats.last_entry = Some(WordEntry {
                word: word.to_owned(),
                frequency: occurrence,
                absolute,
            });
        }
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Hands over the finished trie.
    pub fn finish(self) -> (Trie, BuildStats) {
        debug!(
            nodes = self.stats.nodes,
            words = self.stats.words_added,
            ignored = self.stats.words_ignored,
            "trie populated"
        );
        (self.trie, self.stats)
    }
}

impl<'a> Extend<&'a WordEntry> for TrieBuilder {
    fn extend<T: IntoIterator<Item = &'a WordEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.insert_entry(entry);
        }
    }
}
