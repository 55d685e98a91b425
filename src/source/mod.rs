//! Rank dataset source interfaces and built-in sources.
//!
//! Ownership model:
//! - `RankSource` is the updater-facing interface: it discovers the newest
//!   available period and produces one single-pass row stream per fetch.
//! - `RankStream` carries the exact total row count alongside the iterator
//!   so the driver can report progress without buffering the dataset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::RankStoreError;
use crate::types::{Domain, Period, Rank};

mod jsonl;
pub use jsonl::JsonlRankSource;

/// One row of the rank dataset stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRow {
    /// Lowercase host the observation belongs to.
    pub host: Domain,
    /// Global popularity rank.
    pub global_rank: Rank,
    /// Locally-scoped rank, when the dataset generation provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_rank: Option<Rank>,
}

/// Single-pass stream of rank rows with a known total for progress reporting.
///
/// The stream yields each row exactly once; the dataset may be far too large
/// to hold in memory, so consumers must not assume rewind or replay.
pub struct RankStream<'a> {
    total_rows: u64,
    rows: Box<dyn Iterator<Item = Result<RankRow, RankStoreError>> + 'a>,
}

impl std::fmt::Debug for RankStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankStream")
            .field("total_rows", &self.total_rows)
            .finish_non_exhaustive()
    }
}

impl<'a> RankStream<'a> {
    /// Wrap `rows` with the source-reported exact `total_rows`.
    pub fn new(
        total_rows: u64,
        rows: impl Iterator<Item = Result<RankRow, RankStoreError>> + 'a,
    ) -> Self {
        Self {
            total_rows,
            rows: Box::new(rows),
        }
    }

    /// Exact number of rows the source reported for this fetch.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }
}

impl Iterator for RankStream<'_> {
    type Item = Result<RankRow, RankStoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

/// Updater-facing rank dataset source.
///
/// Implementations wrap whatever backend holds the ranking data (a warehouse
/// result set, a local dump directory, an in-memory fixture). For a fixed
/// dataset state, `fetch_ranks` output must be deterministic.
pub trait RankSource {
    /// Stable source identifier used in errors and logs.
    fn id(&self) -> &str;

    /// Most recent period available in the source's catalog.
    fn latest_period(&self) -> Result<Period, RankStoreError>;

    /// Stream every row of the dataset snapshot for `period`.
    fn fetch_ranks(&self, period: Period) -> Result<RankStream<'_>, RankStoreError>;
}

/// In-memory source for tests and demos, keyed by period.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRankSource {
    id: String,
    periods: BTreeMap<Period, Vec<RankRow>>,
}

impl InMemoryRankSource {
    /// Create an empty source with a stable `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            periods: BTreeMap::new(),
        }
    }

    /// Add the row set for one period, replacing any previous rows for it.
    pub fn with_period(mut self, period: Period, rows: Vec<RankRow>) -> Self {
        self.periods.insert(period, rows);
        self
    }
}

impl RankSource for InMemoryRankSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn latest_period(&self) -> Result<Period, RankStoreError> {
        self.periods
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| RankStoreError::SourceUnavailable {
                source_id: self.id.clone(),
                reason: "no periods loaded".to_string(),
            })
    }

    fn fetch_ranks(&self, period: Period) -> Result<RankStream<'_>, RankStoreError> {
        let rows = self
            .periods
            .get(&period)
            .ok_or_else(|| RankStoreError::SourceUnavailable {
                source_id: self.id.clone(),
                reason: format!("no rows for period {period}"),
            })?;
        Ok(RankStream::new(
            rows.len() as u64,
            rows.iter().cloned().map(Ok),
        ))
    }
}
