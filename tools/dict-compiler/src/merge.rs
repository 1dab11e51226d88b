//! Merging several word lists into the one that gets compiled.
//!
//! Lists are read in order. A word seen again is folded into its first
//! entry, so the merged list keeps first-seen order. A discard list then
//! removes unwanted words, and [`normalize`] can rebuild the relative
//! frequencies from the absolute counts.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use wordtrie_protocol::{WordEntry, MAX_FREQUENCY};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("word {word:?} has no absolute frequency to normalize from")]
    MissingAbsolute { word: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub lists: usize,
    /// Entries folded into an earlier entry of the same word.
    pub duplicates: usize,
    pub discarded: usize,
}

#[derive(Debug, Default)]
pub struct WordListMerger {
    entries: Vec<WordEntry>,
    index: HashMap<String, usize>,
    stats: MergeStats,
}

impl WordListMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_list(&mut self, list: impl IntoIterator<Item = WordEntry>) {
        self.stats.lists += 1;
        for entry in list {
            match self.index.get(&entry.word) {
                Some(&at) => {
                    combine(&mut self.entries[at], entry);
                    self.stats.duplicates += 1;
                }
                None => {
                    self.index.insert(entry.word.clone(), self.entries.len());
                    self.entries.push(entry);
                }
            }
        }
    }

    /// Drops every listed word. Returns how many entries were removed.
    pub fn discard<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) -> usize {
        let unwanted: HashSet<&str> = words.into_iter().collect();
        let before = self.entries.len();
        self.entries.retain(|entry| !unwanted.contains(entry.word.as_str()));

        let removed = before - self.entries.len();
        if removed > 0 {
            self.index = self
                .entries
                .iter()
                .enumerate()
                .map(|(at, entry)| (entry.word.clone(), at))
                .collect();
        }
        self.stats.discarded += removed;
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn finish(self) -> (Vec<WordEntry>, MergeStats) {
        (self.entries, self.stats)
    }
}

/// Relative frequencies add up saturating; absolute counts add up when
/// either side has one.
fn combine(into: &mut WordEntry, other: WordEntry) {
    into.frequency = into.frequency.saturating_add(other.frequency);
    into.absolute = match (into.absolute, other.absolute) {
        (Some(a), Some(b)) => Some(a.saturating_add(b)),
        (a, b) => a.or(b),
    };
}

/// Non-empty lines of a discard list.
pub fn discard_words(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter(|line| !line.is_empty())
}

/// Sorts by absolute count, most frequent first, and rewrites every
/// relative frequency on a log scale of the total:
/// `1 + round(ln(abs) / ln(total) * 255)`, capped at 255.
///
/// Every entry needs an absolute count. Counts of 0, and lists whose total
/// is at most 1, map to 1.
pub fn normalize(entries: &mut [WordEntry]) -> Result<(), MergeError> {
    let mut total = 0u64;
    for entry in entries.iter() {
        let absolute = entry
            .absolute
            .ok_or_else(|| MergeError::MissingAbsolute { word: entry.word.clone() })?;
        total = total.saturating_add(absolute);
    }

    entries.sort_by(|a, b| b.absolute.cmp(&a.absolute));

    let ln_total = (total as f64).ln();
    for entry in entries.iter_mut() {
        let absolute = entry.absolute.unwrap_or_default();
        entry.frequency = if absolute == 0 || total <= 1 {
            1
        } else {
            let scaled = ((absolute as f64).ln() / ln_total * f64::from(MAX_FREQUENCY)).round();
            (1.0 + scaled).min(f64::from(MAX_FREQUENCY)) as u32
        };
    }
    Ok(())
}
