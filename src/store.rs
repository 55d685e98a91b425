use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::constants::layout::{DOMAINS_DIR, LOCK_FILENAME, MARKER_FILENAME, TMP_SUFFIX};
use crate::errors::RankStoreError;
use crate::record::{DomainRecord, RankEntry};
use crate::shard::ShardPath;
use crate::types::Period;

/// Filesystem layout of one store root.
///
/// All paths derive from the root so multiple store roots can coexist in one
/// process (and in tests) without shared path state.
#[derive(Clone, Debug)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the dataset marker document.
    pub fn marker_path(&self) -> PathBuf {
        self.root.join(MARKER_FILENAME)
    }

    /// Directory holding the sharded domain records.
    pub fn domains_dir(&self) -> PathBuf {
        self.root.join(DOMAINS_DIR)
    }

    /// Path of the advisory updater lock.
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILENAME)
    }

    /// Absolute path of the record file for `shard`.
    pub fn record_path(&self, shard: &ShardPath) -> PathBuf {
        self.domains_dir().join(shard.relative())
    }
}

/// Read-modify-write access to the sharded domain records under one root.
#[derive(Clone, Debug)]
pub struct RankStore {
    layout: StoreLayout,
}

impl RankStore {
    /// Create a store over `layout`. No I/O happens until the first access.
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    /// The layout this store operates on.
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Load the record for `domain`, or `None` when the domain has never
    /// been observed.
    ///
    /// An unparsable record file is a fatal [`RankStoreError::RecordCorrupt`]
    /// rather than `None`: silently treating history as absent would lose it
    /// on the next merge. A record whose stored domain differs from
    /// `domain` fails with [`RankStoreError::DomainMismatch`].
    pub fn load(&self, domain: &str) -> Result<Option<DomainRecord>, RankStoreError> {
        let path = self.layout.record_path(&ShardPath::resolve(domain));
        self.read_record(&path, domain)
    }

    /// Merge one `(domain, period, entry)` observation into the store.
    ///
    /// Creates the record on first observation of the domain, otherwise
    /// inserts or overwrites the entry for `period` and rewrites the file.
    /// Idempotent: re-applying the same observation leaves the stored state
    /// unchanged.
    pub fn merge_observation(
        &self,
        domain: &str,
        period: Period,
        entry: RankEntry,
    ) -> Result<(), RankStoreError> {
        let shard = ShardPath::resolve(domain);
        let path = self.layout.record_path(&shard);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut record = match self.read_record(&path, domain)? {
            Some(record) => record,
            None => {
                debug!(domain, path = %path.display(), "creating domain record");
                DomainRecord::new(domain)
            }
        };
        record.upsert(period, entry);
        write_json_atomic(&path, &record)
    }

    fn read_record(
        &self,
        path: &Path,
        domain: &str,
    ) -> Result<Option<DomainRecord>, RankStoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let record: DomainRecord =
            serde_json::from_str(&raw).map_err(|err| RankStoreError::RecordCorrupt {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        if record.domain != domain {
            return Err(RankStoreError::DomainMismatch {
                path: path.to_path_buf(),
                stored: record.domain,
                requested: domain.to_string(),
            });
        }
        Ok(Some(record))
    }
}

/// Serialize `value` to a sibling temp file, then rename over `path`.
///
/// The rename makes each store write all-or-nothing, so a process killed
/// mid-write leaves the previous file contents intact.
pub(crate) fn write_json_atomic<T: Serialize>(
    path: &Path,
    value: &T,
) -> Result<(), RankStoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".");
    tmp.push(TMP_SUFFIX);
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, serde_json::to_vec(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(global: u64, local: Option<u64>) -> RankEntry {
        RankEntry { global, local }
    }

    #[test]
    fn layout_paths_derive_from_root() {
        let layout = StoreLayout::new("/data/ranks");
        assert_eq!(layout.marker_path(), PathBuf::from("/data/ranks/latest.json"));
        assert_eq!(layout.domains_dir(), PathBuf::from("/data/ranks/domains"));
        assert_eq!(layout.lock_path(), PathBuf::from("/data/ranks/.update.lock"));
        let shard = ShardPath::resolve("example.com");
        assert_eq!(
            layout.record_path(&shard),
            PathBuf::from("/data/ranks/domains/0c/aa/f24ab1a0c33440c06afe99df986365b0781f.json")
        );
    }

    #[test]
    fn merge_creates_record_on_first_observation() {
        let temp = tempdir().unwrap();
        let store = RankStore::new(StoreLayout::new(temp.path()));

        store
            .merge_observation("example.com", 202401, entry(5, Some(12)))
            .unwrap();

        let record = store.load("example.com").unwrap().unwrap();
        assert_eq!(record.domain, "example.com");
        assert_eq!(record.ranks[&202401], entry(5, Some(12)));
    }

    #[test]
    fn merge_is_idempotent_per_period() {
        let temp = tempdir().unwrap();
        let store = RankStore::new(StoreLayout::new(temp.path()));

        store.merge_observation("example.com", 202401, entry(5, None)).unwrap();
        store.merge_observation("example.com", 202401, entry(5, None)).unwrap();

        let record = store.load("example.com").unwrap().unwrap();
        assert_eq!(record.ranks.len(), 1);
        assert_eq!(record.ranks[&202401], entry(5, None));
    }

    #[test]
    fn merge_accumulates_history_across_periods() {
        let temp = tempdir().unwrap();
        let store = RankStore::new(StoreLayout::new(temp.path()));

        store.merge_observation("example.com", 202401, entry(5, None)).unwrap();
        store.merge_observation("example.com", 202402, entry(3, Some(8))).unwrap();

        let record = store.load("example.com").unwrap().unwrap();
        let periods: Vec<u32> = record.ranks.keys().copied().collect();
        assert_eq!(periods, vec![202401, 202402]);
        assert_eq!(record.ranks[&202401], entry(5, None));
        assert_eq!(record.ranks[&202402], entry(3, Some(8)));
    }

    #[test]
    fn merge_overwrites_existing_period_entry() {
        let temp = tempdir().unwrap();
        let store = RankStore::new(StoreLayout::new(temp.path()));

        store.merge_observation("example.com", 202401, entry(5, Some(1))).unwrap();
        store.merge_observation("example.com", 202401, entry(9, None)).unwrap();

        let record = store.load("example.com").unwrap().unwrap();
        assert_eq!(record.ranks.len(), 1);
        assert_eq!(record.ranks[&202401], entry(9, None));
    }

    #[test]
    fn load_of_unknown_domain_is_none() {
        let temp = tempdir().unwrap();
        let store = RankStore::new(StoreLayout::new(temp.path()));
        assert!(store.load("never-seen.com").unwrap().is_none());
    }

    #[test]
    fn unparsable_record_is_fatal() {
        let temp = tempdir().unwrap();
        let layout = StoreLayout::new(temp.path());
        let store = RankStore::new(layout.clone());

        let path = layout.record_path(&ShardPath::resolve("example.com"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{not json").unwrap();

        let err = store
            .merge_observation("example.com", 202401, entry(5, None))
            .unwrap_err();
        assert!(matches!(err, RankStoreError::RecordCorrupt { .. }));
        // History must survive the failed merge untouched.
        assert_eq!(fs::read(&path).unwrap(), b"{not json");
    }

    #[test]
    fn domain_mismatch_is_fatal_and_preserves_the_record() {
        let temp = tempdir().unwrap();
        let layout = StoreLayout::new(temp.path());
        let store = RankStore::new(layout.clone());

        // Plant a record for a different domain at example.com's shard path.
        let path = layout.record_path(&ShardPath::resolve("example.com"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let intruder = r#"{"domain":"other.com","ranks":{"202312":{"global":1}}}"#;
        fs::write(&path, intruder).unwrap();

        let err = store
            .merge_observation("example.com", 202401, entry(5, None))
            .unwrap_err();
        match err {
            RankStoreError::DomainMismatch { stored, requested, .. } => {
                assert_eq!(stored, "other.com");
                assert_eq!(requested, "example.com");
            }
            other => panic!("expected DomainMismatch, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), intruder);
    }

    #[test]
    fn atomic_write_leaves_no_temp_file_behind() {
        let temp = tempdir().unwrap();
        let store = RankStore::new(StoreLayout::new(temp.path()));

        store.merge_observation("example.com", 202401, entry(5, None)).unwrap();

        let shard_dir = store
            .layout()
            .record_path(&ShardPath::resolve("example.com"));
        let entries: Vec<_> = fs::read_dir(shard_dir.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
