use serde::Serialize;
use std::path::{Path, PathBuf};
use wordtrie_builder::BuildStats;
use wordtrie_writer::{Truncation, WriteStats};

use crate::merge::MergeStats;

/// JSON summary of one compiler run.
#[derive(Serialize)]
pub struct CompileReport<'a> {
    pub input: &'a [PathBuf],
    pub output: &'a Path,
    pub merge: &'a MergeStats,
    pub build: &'a BuildStats,
    pub write: &'a WriteStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<&'a Truncation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_absolute_frequency: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordtrie_builder::TrieBuilder;
    use wordtrie_writer::{serialize, WriterConfig};

    #[test]
    fn test_report_json() {
        let (trie, build) = TrieBuilder::from_pairs([("cat", 200), ("car", 50)]).finish();
        let dict = serialize(&trie, &WriterConfig::default());

        let input = [PathBuf::from("words.xml"), PathBuf::from("extra.json")];
        let merge = MergeStats { lists: 2, duplicates: 1, discarded: 0 };
        let report = CompileReport {
            input: &input,
            output: Path::new("words.dict"),
            merge: &merge,
            build: &build,
            write: dict.stats(),
            truncation: dict.truncation(),
            last_absolute_frequency: None,
        };
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["input"][0], "words.xml");
        assert_eq!(value["input"][1], "extra.json");
        assert_eq!(value["merge"]["duplicates"], 1);
        assert_eq!(value["build"]["words_added"], 2);
        assert_eq!(value["build"]["last_entry"]["word"], "car");
        assert_eq!(value["write"]["words_written"], 2);
        assert_eq!(value["write"]["bytes_written"], dict.len());
        assert!(value.get("truncation").is_none());
    }

    #[test]
    fn test_report_truncation() {
        let (trie, build) = TrieBuilder::from_pairs([("cat", 200), ("car", 50), ("dog", 10)]).finish();
        let dict = serialize(&trie, &WriterConfig::with_capacity(34).unwrap());

        let input = [PathBuf::from("in.json")];
        let report = CompileReport {
            input: &input,
            output: Path::new("out.dict"),
            merge: &MergeStats::default(),
            build: &build,
            write: dict.stats(),
            truncation: dict.truncation(),
            last_absolute_frequency: Some(5),
        };
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["truncation"]["last_word"], "dog");
        assert_eq!(value["truncation"]["words_written"], 2);
        assert_eq!(value["last_absolute_frequency"], 5);
        assert!(value["truncation"]["error"].as_str().unwrap().starts_with("capacity exceeded"));
    }
}
