//! Arena-backed digit trie.
//!
//! Nodes live in a single `Vec` and refer to their children by index, one
//! slot per decimal digit. A node carries a price only when some route
//! prefix ends there, so a lookup is a single walk down the query that
//! remembers the deepest priced node it passed.

use std::num::NonZeroU32;

use rust_decimal::Decimal;

use super::table::{InsertOutcome, MatchBoundary, Prefix, PrefixCostTable, PrefixMatch};

/// Index of a non-root node in the arena. The root (index 0) is never a child.
type NodeId = NonZeroU32;

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct Node {
    children: [Option<NodeId>; 10],
    price: Option<Decimal>,
}

/// Prefix cost table backed by a digit trie.
#[derive(Debug, Clone)]
pub struct DigitTrie {
    nodes: Vec<Node>,
    entries: usize,
}

impl DigitTrie {
    /// Create an empty trie.
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Create an empty trie with room for `nodes` nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        let mut arena = Vec::with_capacity(nodes.max(1));
        arena.push(Node::default());
        Self {
            nodes: arena,
            entries: 0,
        }
    }

    /// Number of allocated nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn child(&self, node: usize, digit: u8) -> Option<usize> {
        self.nodes[node].children[usize::from(digit)].map(|id| id.get() as usize)
    }

    fn child_or_insert(&mut self, node: usize, digit: u8) -> usize {
        if let Some(existing) = self.child(node, digit) {
            return existing;
        }

        let id = u32::try_from(self.nodes.len())
            .ok()
            .and_then(NodeId::new)
            .expect("trie arena exceeds u32 index space");
        self.nodes.push(Node::default());
        self.nodes[node].children[usize::from(digit)] = Some(id);
        id.get() as usize
    }
}

impl Default for DigitTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixCostTable for DigitTrie {
    fn insert_or_keep_cheaper(&mut self, prefix: &Prefix, price: Decimal) -> InsertOutcome {
        let mut node = ROOT;
        for digit in prefix.digits() {
            node = self.child_or_insert(node, digit);
        }

        let slot = &mut self.nodes[node].price;
        match *slot {
            None => {
                *slot = Some(price);
                self.entries += 1;
                InsertOutcome::Inserted
            }
            Some(previous) if price < previous => {
                *slot = Some(price);
                InsertOutcome::Lowered { previous }
            }
            Some(_) => InsertOutcome::Kept,
        }
    }

    fn longest_match(&self, query: &str, boundary: MatchBoundary) -> Option<PrefixMatch> {
        let max_len = boundary.max_len(query.len());
        let mut node = ROOT;
        let mut best = None;

        for (depth, byte) in query.bytes().take(max_len).enumerate() {
            if !byte.is_ascii_digit() {
                break;
            }
            match self.child(node, byte - b'0') {
                Some(next) => node = next,
                None => break,
            }
            if let Some(price) = self.nodes[node].price {
                best = Some(PrefixMatch {
                    len: depth + 1,
                    price,
                });
            }
        }

        best
    }

    fn len(&self) -> usize {
        self.entries
    }
}
