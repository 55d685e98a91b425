use std::path::PathBuf;

use sha1::{Digest, Sha1};

use crate::constants::layout::RECORD_EXTENSION;
use crate::constants::shard::{DIGEST_HEX_LEN, DIR_LEVEL_LEN};

/// Resolved shard location for one domain: two directory levels plus a file stem.
///
/// Derived purely from the SHA-1 digest of the domain's UTF-8 bytes, split
/// 2/2/36 across the 40 hex characters. The split bounds directory fan-out at
/// 256 entries per level regardless of how many domains exist. Both the hash
/// and the split points are load-bearing for every file already on disk and
/// for external readers that compute record URLs themselves; neither can
/// change without a full store migration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardPath {
    level1: String,
    level2: String,
    stem: String,
}

impl ShardPath {
    /// Resolve the shard path for `domain`.
    ///
    /// Pure and deterministic: the same domain resolves to the same path on
    /// every call and across process restarts. The domain is hashed exactly
    /// as ingestion receives it; callers own any case normalization.
    pub fn resolve(domain: &str) -> Self {
        let digest = hex::encode(Sha1::digest(domain.as_bytes()));
        debug_assert_eq!(digest.len(), DIGEST_HEX_LEN);
        let (level1, rest) = digest.split_at(DIR_LEVEL_LEN);
        let (level2, stem) = rest.split_at(DIR_LEVEL_LEN);
        Self {
            level1: level1.to_string(),
            level2: level2.to_string(),
            stem: stem.to_string(),
        }
    }

    /// First directory level (hex characters 0..2).
    pub fn level1(&self) -> &str {
        &self.level1
    }

    /// Second directory level (hex characters 2..4).
    pub fn level2(&self) -> &str {
        &self.level2
    }

    /// File stem (hex characters 4..40, no extension).
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Record path relative to the domains directory, e.g. `0c/aa/f24a….json`.
    pub fn relative(&self) -> PathBuf {
        PathBuf::from(&self.level1)
            .join(&self.level2)
            .join(format!("{}.{}", self.stem, RECORD_EXTENSION))
    }
}
