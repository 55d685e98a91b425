use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::RankStoreError;
use crate::source::{RankRow, RankSource, RankStream};
use crate::types::Period;

const DUMP_EXTENSION: &str = "jsonl";

/// File-backed rank source reading `<dir>/<yyyymm>.jsonl` dumps.
///
/// Each dump holds one JSON row per line
/// (`{"host": "example.com", "global_rank": 5, "local_rank": 12}`).
/// Rows are read line by line and never buffered in full, matching the
/// streaming contract the updater expects from warehouse-backed sources.
pub struct JsonlRankSource {
    id: String,
    dir: PathBuf,
}

impl JsonlRankSource {
    /// Create a source over the dump directory `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            id: "jsonl".to_string(),
            dir: dir.into(),
        }
    }

    /// Override the stable source identifier used in errors and logs.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    fn dump_path(&self, period: Period) -> PathBuf {
        self.dir.join(format!("{period}.{DUMP_EXTENSION}"))
    }

    fn unavailable(&self, reason: impl Into<String>) -> RankStoreError {
        RankStoreError::SourceUnavailable {
            source_id: self.id.clone(),
            reason: reason.into(),
        }
    }

    fn open_dump(&self, period: Period) -> Result<BufReader<File>, RankStoreError> {
        let path = self.dump_path(period);
        let file = File::open(&path)
            .map_err(|err| self.unavailable(format!("cannot open {}: {err}", path.display())))?;
        Ok(BufReader::new(file))
    }
}

impl RankSource for JsonlRankSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn latest_period(&self) -> Result<Period, RankStoreError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|err| self.unavailable(format!("cannot list {}: {err}", self.dir.display())))?;
        let mut latest: Option<Period> = None;
        for entry in entries {
            let entry = entry.map_err(|err| self.unavailable(err.to_string()))?;
            if let Some(period) = dump_period(&entry.path()) {
                latest = Some(latest.map_or(period, |seen| seen.max(period)));
            }
        }
        latest.ok_or_else(|| {
            self.unavailable(format!("no <yyyymm>.jsonl dumps in {}", self.dir.display()))
        })
    }

    fn fetch_ranks(&self, period: Period) -> Result<RankStream<'_>, RankStoreError> {
        // One cheap counting pass for the exact total, then the real
        // streaming pass. Local files make the double read affordable.
        let mut total_rows = 0u64;
        for line in self.open_dump(period)?.lines() {
            let line = line.map_err(|err| self.unavailable(err.to_string()))?;
            if !line.trim().is_empty() {
                total_rows += 1;
            }
        }
        debug!(source = %self.id, period, total_rows, "opened rank dump");

        let source_id = self.id.clone();
        let rows = self
            .open_dump(period)?
            .lines()
            .filter(|line| match line {
                Ok(line) => !line.trim().is_empty(),
                Err(_) => true,
            })
            .map(move |line| {
                let line = line.map_err(|err| RankStoreError::SourceUnavailable {
                    source_id: source_id.clone(),
                    reason: err.to_string(),
                })?;
                serde_json::from_str::<RankRow>(&line).map_err(|err| {
                    RankStoreError::SourceInconsistent {
                        source_id: source_id.clone(),
                        details: format!("malformed row '{line}': {err}"),
                    }
                })
            });
        Ok(RankStream::new(total_rows, rows))
    }
}

/// Parse the `YYYYMM` period out of a dump filename, if it is one.
fn dump_period(path: &Path) -> Option<Period> {
    if !path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DUMP_EXTENSION))
    {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}
