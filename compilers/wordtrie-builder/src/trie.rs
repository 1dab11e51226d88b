use std::fmt;

use wordtrie_protocol::{clamp_frequency, NodeId};

/// A node of the in-memory character trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieNode {
    character: u16,
    frequency: u8,
    terminal: bool,
    children: Vec<NodeId>,
}

impl TrieNode {
    fn new(character: u16, frequency: u8) -> Self {
        Self { character, frequency, terminal: false, children: Vec::new() }
    }

    /// UTF-16 code unit on the edge leading to this node.
    pub fn character(&self) -> u16 {
        self.character
    }

    pub fn frequency(&self) -> u8 {
        self.frequency
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Child group in first-seen order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Where a word landed in the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub root: NodeId,
    /// Node of the last character.
    pub last: NodeId,
    /// The root frequency hit 255 and dropped part of this occurrence.
    pub root_saturated: bool,
}

/// Character trie stored as a node arena plus the ordered root group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    roots: Vec<NodeId>,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root sibling group, one node per distinct first character.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id.index()]
    }

    /// Number of nodes created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of terminal nodes, i.e. distinct words.
    pub fn word_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.terminal).count()
    }

    /// Follows `word` from the root group and returns the node it ends on.
    pub fn find(&self, word: &str) -> Option<NodeId> {
        let mut group = self.roots.as_slice();
        let mut found = None;
        for unit in word.encode_utf16() {
            let id = self.child_by_char(group, unit)?;
            group = self.node(id).children();
            found = Some(id);
        }
        found
    }

    fn child_by_char(&self, group: &[NodeId], unit: u16) -> Option<NodeId> {
        // Linear scan, first match wins
        group.iter().copied().find(|&id| self.node(id).character == unit)
    }

    fn alloc(&mut self, character: u16, frequency: u8) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(TrieNode::new(character, frequency));
        id
    }

    /// Adds one word of UTF-16 units with an already clamped occurrence.
    ///
    /// Roots accumulate the occurrence of every word sharing their character.
    /// Interior nodes take the occurrence of the first word that creates them
    /// (while their frequency is still 0), and the node of the last character
    /// is marked terminal with its frequency overwritten. A one-unit word marks
    /// the root itself terminal without touching the accumulated frequency.
    ///
    /// Returns `None` for an empty word.
    pub fn add_word(&mut self, units: &[u16], occurrence: u8) -> Option<Insertion> {
        let (&first, rest) = units.split_first()?;

        let mut root_saturated = false;
        let root = match self.child_by_char(&self.roots, first) {
            Some(id) => {
                let node = &mut self.nodes[id.index()];
                let sum = u32::from(node.frequency) + u32::from(occurrence);
                root_saturated = sum > u32::from(u8::MAX);
                node.frequency = clamp_frequency(sum);
                id
            }
            None => {
                let id = self.alloc(first, occurrence);
                self.roots.push(id);
                id
            }
        };

        let mut current = root;
        for &unit in rest {
            let child = match self.child_by_char(self.node(current).children(), unit) {
                Some(id) => id,
                None => {
                    let id = self.alloc(unit, 0);
                    self.nodes[current.index()].children.push(id);
                    id
                }
            };
            let node = &mut self.nodes[child.index()];
            if node.frequency == 0 {
                node.frequency = occurrence;
            }
            current = child;
        }

        let last = &mut self.nodes[current.index()];
        last.terminal = true;
        if !rest.is_empty() {
            last.frequency = occurrence;
        }

        Some(Insertion { root, last: current, root_saturated })
    }

    fn fmt_group(&self, f: &mut fmt::Formatter<'_>, group: &[NodeId]) -> fmt::Result {
        for &id in group {
            let node = self.node(id);
            let c = char::from_u32(u32::from(node.character)).unwrap_or(char::REPLACEMENT_CHARACTER);
            write!(f, "[ {} [ ", c)?;
            self.fmt_group(f, node.children())?;
            write!(f, " ] ] ")?;
        }
        Ok(())
    }
}

/// Bracketed nesting dump, e.g. `[ c [ [ a [ ... ] ] ] ]`. Debugging aid.
impl fmt::Display for Trie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_group(f, &self.roots)
    }
}
