//! Hash-keyed prefix cost table.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::table::{InsertOutcome, MatchBoundary, Prefix, PrefixCostTable, PrefixMatch};

/// Prefix cost table backed by an exact-match hash map.
///
/// A lookup probes every candidate prefix of the query from longest to
/// shortest, so it costs one hash probe per eligible length.
#[derive(Debug, Clone, Default)]
pub struct FlatTable {
    prices: HashMap<String, Decimal>,
}

impl FlatTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with room for `entries` prefixes.
    pub fn with_capacity(entries: usize) -> Self {
        Self {
            prices: HashMap::with_capacity(entries),
        }
    }
}

impl PrefixCostTable for FlatTable {
    fn insert_or_keep_cheaper(&mut self, prefix: &Prefix, price: Decimal) -> InsertOutcome {
        match self.prices.get_mut(prefix.as_str()) {
            None => {
                self.prices.insert(prefix.as_str().to_string(), price);
                InsertOutcome::Inserted
            }
            Some(stored) if price < *stored => {
                let previous = *stored;
                *stored = price;
                InsertOutcome::Lowered { previous }
            }
            Some(_) => InsertOutcome::Kept,
        }
    }

    fn longest_match(&self, query: &str, boundary: MatchBoundary) -> Option<PrefixMatch> {
        let max_len = boundary.max_len(query.len());

        (1..=max_len).rev().find_map(|len| {
            // None inside a multi-byte char; never a digit key
            let candidate = query.get(..len)?;
            self.prices
                .get(candidate)
                .map(|&price| PrefixMatch { len, price })
        })
    }

    fn len(&self) -> usize {
        self.prices.len()
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
    fn test_min_aggregation() {
        let mut table = FlatTable::new();
        table.insert_or_keep_cheaper(&p("449275049"), dec("0.49"));
        table.insert_or_keep_cheaper(&p("449275049"), dec("0.51"));
        table.insert_or_keep_cheaper(&p("449275049"), dec("0.12"));

        assert_eq!(table.len(), 1);
        assert_eq!(table.longest_prefix_cost("4492750491234"), Some(dec("0.12")));
    }

    #[test]
    fn test_prices_compare_numerically() {
        // "10.00" sorts before "9.50" as text
        let mut table = FlatTable::new();
        table.insert_or_keep_cheaper(&p("44"), dec("9.50"));
        table.insert_or_keep_cheaper(&p("44"), dec("10.00"));

        assert_eq!(table.longest_prefix_cost("4420"), Some(dec("9.50")));
    }

    #[test]
    fn test_longest_candidate_first() {
        let mut table = FlatTable::with_capacity(4);
        table.insert_or_keep_cheaper(&p("861"), dec("2.0"));
        table.insert_or_keep_cheaper(&p("86153"), dec("0.84"));

        assert_eq!(
            table.longest_match("86153023841", MatchBoundary::ProperPrefix),
            Some(PrefixMatch {
                len: 5,
                price: dec("0.84")
            })
        );
    }

    #[test]
    fn test_boundary() {
        let mut table = FlatTable::new();
        table.insert_or_keep_cheaper(&p("5551234"), dec("0.10"));

        assert_eq!(table.longest_prefix_cost("5551234"), None);
        assert_eq!(
            table
                .longest_match("5551234", MatchBoundary::Inclusive)
                .map(|m| m.price),
            Some(dec("0.10"))
        );
    }

    #[test]
    fn test_empty_and_multibyte_queries() {
        let mut table = FlatTable::new();
        table.insert_or_keep_cheaper(&p("8"), dec("1"));

        assert_eq!(table.longest_prefix_cost(""), None);
        assert_eq!(table.longest_prefix_cost("8é1"), Some(dec("1")));
    }
}
