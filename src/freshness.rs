use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::RankStoreError;
use crate::store::write_json_atomic;
use crate::types::Period;

/// Marker document recording the most recently fully-ingested period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMarker {
    /// `YYYYMM` period of the last completed ingestion run.
    pub date: Period,
}

/// Go/no-go gate comparing the persisted marker against a candidate period.
///
/// The gate owns only the marker path, so independent store roots get
/// independent gates. A missing or unparsable marker means "never run": the
/// run proceeds as a first-ever ingestion and the marker is rewritten
/// wholesale on commit, so a damaged marker costs one redundant (idempotent)
/// pass rather than an abort.
#[derive(Clone, Debug)]
pub struct FreshnessGate {
    marker_path: PathBuf,
}

impl FreshnessGate {
    /// Create a gate over the marker at `marker_path`.
    pub fn new(marker_path: impl Into<PathBuf>) -> Self {
        Self {
            marker_path: marker_path.into(),
        }
    }

    /// Read the current marker, treating absence and parse failure as
    /// "never run".
    pub fn current(&self) -> Option<DatasetMarker> {
        let raw = match fs::read_to_string(&self.marker_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(
                    path = %self.marker_path.display(),
                    error = %err,
                    "marker unreadable, treating as never run"
                );
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(marker) => Some(marker),
            Err(err) => {
                warn!(
                    path = %self.marker_path.display(),
                    error = %err,
                    "marker unparsable, treating as never run"
                );
                None
            }
        }
    }

    /// Whether an ingestion run is needed for `candidate`.
    ///
    /// True when `force` is set, no marker exists, or `candidate` is strictly
    /// newer than the marked period.
    pub fn should_run(&self, candidate: Period, force: bool) -> bool {
        if force {
            return true;
        }
        match self.current() {
            Some(marker) => candidate > marker.date,
            None => true,
        }
    }

    /// Overwrite the marker with `period`.
    ///
    /// Call only after the full observation stream for `period` has been
    /// durably merged; a run that fails or is skipped never commits.
    pub fn commit(&self, period: Period) -> Result<(), RankStoreError> {
        if let Some(parent) = self.marker_path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_json_atomic(&self.marker_path, &DatasetMarker { date: period })?;
        debug!(period, path = %self.marker_path.display(), "marker committed");
        Ok(())
    }
}
