use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::errors::RankStoreError;
use crate::freshness::FreshnessGate;
use crate::progress::ProgressMeter;
use crate::record::RankEntry;
use crate::source::RankSource;
use crate::store::{RankStore, StoreLayout};
use crate::types::Period;

/// Options controlling one update run.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateOptions {
    /// Reprocess the target period even when the marker says it is ingested.
    pub force: bool,
    /// Ingest this period instead of the newest one the source offers.
    pub period: Option<Period>,
}

/// Result of a completed update attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A full pass ran and the marker was committed.
    Updated {
        /// Period that was ingested.
        period: Period,
        /// Number of rows merged into the store.
        rows: u64,
    },
    /// The freshness gate decided no run was needed.
    AlreadyCurrent {
        /// Period the store is already current with.
        period: Period,
    },
}

/// Advisory lock held for the duration of one update run.
///
/// The store has no per-file locking; safety rests on one updater per root.
/// Exclusive creation of the lock file turns that operational rule into a
/// hard failure instead of silent corruption when two runs overlap.
#[derive(Debug)]
struct UpdateLock {
    path: PathBuf,
}

impl UpdateLock {
    fn acquire(path: &Path) -> Result<Self, RankStoreError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::AlreadyExists {
                    RankStoreError::StoreLocked {
                        path: path.to_path_buf(),
                    }
                } else {
                    err.into()
                }
            })?;
        // Owner breadcrumbs for whoever has to clean up a stale lock.
        let _ = writeln!(file, "pid={} acquired={}", std::process::id(), Utc::now().to_rfc3339());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for UpdateLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Drives one ingestion pass: gate check, row stream, marker commit.
///
/// Rows are merged one at a time in source order; an interrupted run leaves
/// already-merged records updated but the marker uncommitted, so the next run
/// safely reprocesses the same period.
pub struct Updater<'a> {
    source: &'a dyn RankSource,
    layout: StoreLayout,
}

impl<'a> Updater<'a> {
    /// Create an updater pulling from `source` into the store at `layout`.
    pub fn new(source: &'a dyn RankSource, layout: StoreLayout) -> Self {
        Self { source, layout }
    }

    /// Run one update pass without progress reporting.
    pub fn run(&self, options: UpdateOptions) -> Result<UpdateOutcome, RankStoreError> {
        self.run_with_progress(options, |_| {})
    }

    /// Run one update pass, invoking `on_progress` with each new integer
    /// percentage of rows processed.
    pub fn run_with_progress(
        &self,
        options: UpdateOptions,
        mut on_progress: impl FnMut(u8),
    ) -> Result<UpdateOutcome, RankStoreError> {
        let target = match options.period {
            Some(period) => period,
            None => self.source.latest_period()?,
        };
        let gate = FreshnessGate::new(self.layout.marker_path());
        if !gate.should_run(target, options.force) {
            // should_run is false only when a marker exists at >= target.
            let current = gate.current().map(|marker| marker.date).unwrap_or(target);
            debug!(target, current, "store already current, skipping run");
            return Ok(UpdateOutcome::AlreadyCurrent { period: current });
        }

        fs::create_dir_all(self.layout.root())?;
        let _lock = UpdateLock::acquire(&self.layout.lock_path())?;

        let store = RankStore::new(self.layout.clone());
        let stream = self.source.fetch_ranks(target)?;
        info!(
            source = self.source.id(),
            period = target,
            total_rows = stream.total_rows(),
            "starting ingestion run"
        );
        let mut meter = ProgressMeter::new(stream.total_rows());
        for row in stream {
            let row = row?;
            store.merge_observation(
                &row.host,
                target,
                RankEntry {
                    global: row.global_rank,
                    local: row.local_rank,
                },
            )?;
            if let Some(percent) = meter.advance() {
                on_progress(percent);
            }
        }
        let rows = meter.seen();
        gate.commit(target)?;
        info!(period = target, rows, "ingestion run complete");
        Ok(UpdateOutcome::Updated {
            period: target,
            rows,
        })
    }
}
