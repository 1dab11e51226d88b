pub mod builder;
pub mod trie;

pub use builder::{BuildStats, TrieBuilder};
pub use trie::{Insertion, Trie, TrieNode};
