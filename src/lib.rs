#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// CLI runner for the updater binary.
pub mod cli;
/// Centralized constants for the on-disk layout, shard geometry, and periods.
pub mod constants;
/// Dataset freshness marker and go/no-go gate.
pub mod freshness;
/// Ingestion driver wiring gate, source, and store together.
pub mod ingest;
/// Integer-percent progress reporting.
pub mod progress;
/// Domain record and rank entry types.
pub mod record;
/// Shard path resolution from domain names.
pub mod shard;
/// Rank dataset source traits and built-in sources.
pub mod source;
/// Read-modify-write access to the sharded domain records.
pub mod store;
/// Shared type aliases.
pub mod types;

mod errors;

pub use errors::RankStoreError;
pub use freshness::{DatasetMarker, FreshnessGate};
pub use ingest::{UpdateOptions, UpdateOutcome, Updater};
pub use progress::ProgressMeter;
pub use record::{DomainRecord, RankEntry};
pub use shard::ShardPath;
pub use source::{InMemoryRankSource, JsonlRankSource, RankRow, RankSource, RankStream};
pub use store::{RankStore, StoreLayout};
pub use types::{Domain, Period, Rank};
