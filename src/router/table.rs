//! Prefix cost table contract shared by the routing backends.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::flat::FlatTable;
use super::trie::DigitTrie;

/// A validated dialing prefix: non-empty, ASCII digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix(String);

impl Prefix {
    /// Validate and wrap a prefix string.
    pub fn new(prefix: impl Into<String>) -> Result<Self, PrefixError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(PrefixError::Empty);
        }
        if let Some(c) = prefix.chars().find(|c| !c.is_ascii_digit()) {
            return Err(PrefixError::NonDigit {
                prefix,
                character: c,
            });
        }
        Ok(Self(prefix))
    }

    /// Prefix as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digit values (0-9) in dialing order.
    pub fn digits(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.bytes().map(|b| b - b'0')
    }

    /// Number of digits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the prefix has no digits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Prefix {
    type Error = PrefixError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Prefix validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefixError {
    #[error("prefix is empty")]
    Empty,

    #[error("prefix '{prefix}' contains non-digit character {character:?}")]
    NonDigit { prefix: String, character: char },
}

/// Result of an `insert_or_keep_cheaper` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Prefix was not present
    Inserted,
    /// Prefix was present with a higher price, now replaced
    Lowered { previous: Decimal },
    /// Prefix was present with an equal or lower price
    Kept,
}

/// Which candidate lengths are eligible for a longest-prefix match.
///
/// For a query of length `n`, `ProperPrefix` considers lengths `1..n` and
/// `Inclusive` considers `1..=n`. The empty prefix never matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBoundary {
    /// Never match the complete query against itself
    #[default]
    ProperPrefix,
    /// Allow the complete query to match
    Inclusive,
}

impl MatchBoundary {
    /// Longest candidate length eligible for a query of `query_len` bytes.
    pub fn max_len(self, query_len: usize) -> usize {
        match self {
            MatchBoundary::ProperPrefix => query_len.saturating_sub(1),
            MatchBoundary::Inclusive => query_len,
        }
    }
}

/// A successful longest-prefix lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch {
    /// Length of the matched prefix
    pub len: usize,
    /// Cheapest price stored for that prefix
    pub price: Decimal,
}

/// Mapping from dialing prefix to its cheapest observed price.
pub trait PrefixCostTable: Send + Sync {
    /// Insert `prefix` at `price`, or lower the stored price if `price` is cheaper.
    fn insert_or_keep_cheaper(&mut self, prefix: &Prefix, price: Decimal) -> InsertOutcome;

    /// Longest stored prefix of `query` within `boundary`.
    fn longest_match(&self, query: &str, boundary: MatchBoundary) -> Option<PrefixMatch>;

    /// Number of distinct prefixes stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Price of the longest proper prefix of `query` present in the table.
    ///
    /// The full query is never a candidate; see [`MatchBoundary::ProperPrefix`].
    fn longest_prefix_cost(&self, query: &str) -> Option<Decimal> {
        self.longest_match(query, MatchBoundary::ProperPrefix)
            .map(|m| m.price)
    }
}

/// Table backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Arena digit trie
    #[default]
    Trie,
    /// Hash map probed per candidate length
    Hash,
}

/// Prefix cost table with a runtime-selected backend.
#[derive(Debug, Clone)]
pub enum RouteTable {
    Trie(DigitTrie),
    Hash(FlatTable),
}

impl RouteTable {
    /// Create an empty table for the given backend.
    pub fn new(backend: Backend) -> Self {
        match backend {
            Backend::Trie => RouteTable::Trie(DigitTrie::new()),
            Backend::Hash => RouteTable::Hash(FlatTable::new()),
        }
    }

    /// Backend in use.
    pub fn backend(&self) -> Backend {
        match self {
            RouteTable::Trie(_) => Backend::Trie,
            RouteTable::Hash(_) => Backend::Hash,
        }
    }
}

impl PrefixCostTable for RouteTable {
    fn insert_or_keep_cheaper(&mut self, prefix: &Prefix, price: Decimal) -> InsertOutcome {
        match self {
            RouteTable::Trie(t) => t.insert_or_keep_cheaper(prefix, price),
            RouteTable::Hash(t) => t.insert_or_keep_cheaper(prefix, price),
        }
    }

    fn longest_match(&self, query: &str, boundary: MatchBoundary) -> Option<PrefixMatch> {
        match self {
            RouteTable::Trie(t) => t.longest_match(query, boundary),
            RouteTable::Hash(t) => t.longest_match(query, boundary),
        }
    }

    fn len(&self) -> usize {
        match self {
            RouteTable::Trie(t) => t.len(),
            RouteTable::Hash(t) => t.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn p(s: &str) -> Prefix {
        Prefix::new(s).unwrap()
    }

    #[test]
    fn test_prefix_validation() {
        assert_eq!(p("86153").as_str(), "86153");
        assert_eq!(Prefix::new(""), Err(PrefixError::Empty));
        assert!(matches!(
            Prefix::new("86a"),
            Err(PrefixError::NonDigit { character: 'a', .. })
        ));
        assert!(Prefix::try_from("+86").is_err());
    }

    #[test]
    fn test_prefix_digits() {
        let digits: Vec<u8> = p("8130").digits().collect();
        assert_eq!(digits, vec![8, 1, 3, 0]);
    }

    #[test]
    fn test_boundary_max_len() {
        assert_eq!(MatchBoundary::ProperPrefix.max_len(11), 10);
        assert_eq!(MatchBoundary::ProperPrefix.max_len(0), 0);
        assert_eq!(MatchBoundary::Inclusive.max_len(11), 11);
    }

    #[test]
    fn test_backends_agree() {
        let routes = [
            ("1", "0.90"),
            ("86", "1.50"),
            ("861", "2.0"),
            ("86153", "0.84"),
            ("86153", "0.95"),
            ("8615302", "0.40"),
            ("449275049", "0.49"),
            ("8130", "0.68"),
        ];
        let queries = [
            "86153023841",
            "8615302",
            "86153",
            "8610",
            "8",
            "",
            "4492750491",
            "813",
            "5551234",
            "86x153",
        ];

        let mut trie = RouteTable::new(Backend::Trie);
        let mut hash = RouteTable::new(Backend::Hash);
        for (prefix, price) in routes {
            let a = trie.insert_or_keep_cheaper(&p(prefix), dec(price));
            let b = hash.insert_or_keep_cheaper(&p(prefix), dec(price));
            assert_eq!(a, b);
        }
        assert_eq!(trie.len(), hash.len());

        for boundary in [MatchBoundary::ProperPrefix, MatchBoundary::Inclusive] {
            for q in queries {
                assert_eq!(
                    trie.longest_match(q, boundary),
                    hash.longest_match(q, boundary),
                    "query {q} boundary {boundary:?}"
                );
            }
        }
    }

    #[test]
    fn test_longest_prefix_cost_defaults_to_proper_prefix() {
        let mut table = RouteTable::new(Backend::Trie);
        table.insert_or_keep_cheaper(&p("5551234"), dec("0.10"));

        assert_eq!(table.longest_prefix_cost("5551234"), None);
        assert_eq!(table.longest_prefix_cost("55512345"), Some(dec("0.10")));
    }

    #[test]
    fn test_backend_deserialize() {
        let backend: Backend = serde_yaml::from_str("hash").unwrap();
        assert_eq!(backend, Backend::Hash);
        assert_eq!(RouteTable::new(backend).backend(), Backend::Hash);

        let boundary: MatchBoundary = serde_yaml::from_str("inclusive").unwrap();
        assert_eq!(boundary, MatchBoundary::Inclusive);
    }
}
