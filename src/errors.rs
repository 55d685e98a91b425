use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Domain;

/// Error type for rank source, store, and updater failures.
#[derive(Debug, Error)]
pub enum RankStoreError {
    #[error("rank source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: String, reason: String },
    #[error("rank source '{source_id}' returned inconsistent data: {details}")]
    SourceInconsistent { source_id: String, details: String },
    #[error("domain record at {path} is unreadable: {reason}")]
    RecordCorrupt { path: PathBuf, reason: String },
    #[error(
        "domain record at {path} belongs to '{stored}' but '{requested}' hashes there; \
         hash collision or store corruption, manual inspection required"
    )]
    DomainMismatch {
        path: PathBuf,
        stored: Domain,
        requested: Domain,
    },
    #[error("store is locked by another updater (lock file {path})")]
    StoreLocked { path: PathBuf },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("serialization failure: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}
