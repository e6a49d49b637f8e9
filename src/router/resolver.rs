//! Batch resolution of phone numbers against a frozen prefix cost table.

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, trace, warn};

use crate::ingest::PhoneNumber;

use super::table::{MatchBoundary, PrefixCostTable};

/// Resolved routing cost for one phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCost {
    /// Number as read from the input
    pub number: PhoneNumber,
    /// Cheapest price of the longest matching prefix, 0 when nothing matched
    pub cost: Decimal,
    /// Length of the matched prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_len: Option<usize>,
}

impl ResolvedCost {
    /// Whether a prefix matched (a matched price may itself be 0).
    pub fn is_matched(&self) -> bool {
        self.prefix_len.is_some()
    }
}

impl fmt::Display for ResolvedCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.number, self.cost)
    }
}

/// Summary of a resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub numbers: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Sum of costs, saturating at `Decimal::MAX`
    pub total_cost: Decimal,
    /// Whether `total_cost` hit `Decimal::MAX`
    pub total_saturated: bool,
}

impl ResolutionStats {
    /// Tally a slice of results.
    pub fn from_results(results: &[ResolvedCost]) -> Self {
        results.iter().fold(Self::default(), |mut stats, r| {
            stats.numbers += 1;
            if r.is_matched() {
                stats.matched += 1;
            } else {
                stats.unmatched += 1;
            }
            match stats.total_cost.checked_add(r.cost) {
                Some(total) => stats.total_cost = total,
                None => {
                    stats.total_cost = Decimal::MAX;
                    stats.total_saturated = true;
                }
            }
            stats
        })
    }
}

/// Resolver errors.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("resolution worker failed: {0}")]
    WorkerFailed(#[from] tokio::task::JoinError),

    #[error("invalid worker settings: {0}")]
    InvalidSettings(String),
}

/// Resolves phone numbers to costs against a read-only prefix cost table.
///
/// Constructing a resolver takes ownership of the table, so every insert has
/// happened before the first lookup.
#[derive(Debug)]
pub struct RoutingResolver<T> {
    table: Arc<T>,
    boundary: MatchBoundary,
}

impl<T> Clone for RoutingResolver<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            boundary: self.boundary,
        }
    }
}

impl<T: PrefixCostTable + 'static> RoutingResolver<T> {
    /// Freeze `table` and resolve with the default proper-prefix boundary.
    pub fn new(table: T) -> Self {
        debug!(entries = table.len(), "routing table frozen");
        Self {
            table: Arc::new(table),
            boundary: MatchBoundary::default(),
        }
    }

    /// Set the match boundary.
    pub fn with_boundary(mut self, boundary: MatchBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// The frozen table.
    pub fn table(&self) -> &T {
        &self.table
    }

    /// Match boundary in use.
    pub fn boundary(&self) -> MatchBoundary {
        self.boundary
    }

    /// Resolve a single number.
    pub fn resolve_one(&self, number: PhoneNumber) -> ResolvedCost {
        resolve_number(self.table.as_ref(), self.boundary, number)
    }

    /// Resolve numbers in order on the calling thread.
    pub fn resolve<I>(&self, numbers: I) -> Vec<ResolvedCost>
    where
        I: IntoIterator<Item = PhoneNumber>,
    {
        let results: Vec<ResolvedCost> = numbers
            .into_iter()
            .map(|number| self.resolve_one(number))
            .collect();

        log_summary(&results);
        results
    }

    /// Resolve numbers on the blocking pool, `chunk_size` numbers per task and
    /// at most `workers` tasks at a time. Output order matches input order.
    pub async fn resolve_parallel(
        &self,
        numbers: Vec<PhoneNumber>,
        workers: usize,
        chunk_size: usize,
    ) -> Result<Vec<ResolvedCost>, ResolveError> {
        if workers == 0 || chunk_size == 0 {
            return Err(ResolveError::InvalidSettings(format!(
                "workers ({workers}) and chunk_size ({chunk_size}) must be positive"
            )));
        }

        let total = numbers.len();
        if workers == 1 || total <= chunk_size {
            return Ok(self.resolve(numbers));
        }

        let permits = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(total.div_ceil(chunk_size));
        let mut pending = numbers.into_iter().peekable();

        while pending.peek().is_some() {
            let chunk: Vec<PhoneNumber> = pending.by_ref().take(chunk_size).collect();
            let permit = Arc::clone(&permits).acquire_owned().await;
            let table = Arc::clone(&self.table);
            let boundary = self.boundary;

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                chunk
                    .into_iter()
                    .map(|number| resolve_number(table.as_ref(), boundary, number))
                    .collect::<Vec<_>>()
            }));
        }

        debug!(
            numbers = total,
            chunks = handles.len(),
            workers,
            "dispatched resolution chunks"
        );

        let mut results = Vec::with_capacity(total);
        for handle in handles {
            results.extend(handle.await?);
        }

        log_summary(&results);
        Ok(results)
    }
}

fn resolve_number<T: PrefixCostTable + ?Sized>(
    table: &T,
    boundary: MatchBoundary,
    number: PhoneNumber,
) -> ResolvedCost {
    match table.longest_match(number.as_str(), boundary) {
        Some(m) => {
            trace!(number = %number, prefix_len = m.len, cost = %m.price, "prefix matched");
            ResolvedCost {
                number,
                cost: m.price,
                prefix_len: Some(m.len),
            }
        }
        None => {
            trace!(number = %number, "no prefix matched");
            ResolvedCost {
                number,
                cost: Decimal::ZERO,
                prefix_len: None,
            }
        }
    }
}

fn log_summary(results: &[ResolvedCost]) {
    let stats = ResolutionStats::from_results(results);
    info!(
        numbers = stats.numbers,
        matched = stats.matched,
        unmatched = stats.unmatched,
        total_cost = %stats.total_cost,
        "resolved routing costs"
    );
    if stats.total_saturated {
        warn!(numbers = stats.numbers, "total routing cost overflowed, reported as maximum");
    }
}
