use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Domain, Period, Rank};

/// One rank observation for a domain in a single period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    /// Global popularity rank.
    pub global: Rank,
    /// Locally-scoped rank, when the dataset generation provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<Rank>,
}

/// Persisted JSON document holding one domain's full rank history.
///
/// On disk this is
/// `{"domain": "example.com", "ranks": {"202401": {"global": 5, "local": 12}}}`.
/// Observations are keyed by period: merging a period that is already present
/// overwrites that period's entry (last write wins), never duplicates it, and
/// iteration order is ascending by period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// The domain this record belongs to, checked against the requested
    /// domain on every read to catch hash collisions and corruption.
    pub domain: Domain,
    /// Historical observations keyed by `YYYYMM` period.
    pub ranks: BTreeMap<Period, RankEntry>,
}

impl DomainRecord {
    /// Create an empty record for `domain`.
    pub fn new(domain: impl Into<Domain>) -> Self {
        Self {
            domain: domain.into(),
            ranks: BTreeMap::new(),
        }
    }

    /// Insert or overwrite the observation for `period`.
    pub fn upsert(&mut self, period: Period, entry: RankEntry) {
        self.ranks.insert(period, entry);
    }

    /// Most recent observation, if any.
    pub fn latest(&self) -> Option<(Period, RankEntry)> {
        self.ranks
            .iter()
            .next_back()
            .map(|(period, entry)| (*period, *entry))
    }
}
