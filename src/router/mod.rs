//! Least-cost prefix routing.
//!
//! Resolves a phone number to the cheapest price of its longest known prefix:
//! - Prefix cost tables (digit trie or hash map backend)
//! - Cheapest-price aggregation per distinct prefix
//! - Configurable full-number match boundary
//! - Sequential and chunked parallel batch resolution

mod flat;
mod resolver;
mod table;
mod trie;

pub use flat::FlatTable;
pub use resolver::{ResolutionStats, ResolveError, ResolvedCost, RoutingResolver};
pub use table::{
    Backend, InsertOutcome, MatchBoundary, Prefix, PrefixCostTable, PrefixError, PrefixMatch,
    RouteTable,
};
pub use trie::DigitTrie;
