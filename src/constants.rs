/// Constants describing the fixed on-disk store layout.
pub mod layout {
    /// Filename of the dataset marker document under the store root.
    pub const MARKER_FILENAME: &str = "latest.json";
    /// Directory under the store root holding the sharded domain records.
    pub const DOMAINS_DIR: &str = "domains";
    /// Extension for domain record files.
    pub const RECORD_EXTENSION: &str = "json";
    /// Suffix appended to a target filename while writing its replacement.
    pub const TMP_SUFFIX: &str = "tmp";
    /// Filename of the advisory updater lock under the store root.
    pub const LOCK_FILENAME: &str = ".update.lock";
}

/// Constants describing shard path geometry.
///
/// These are frozen: external readers compute the same SHA-1 split to fetch
/// records directly, and changing them would orphan every existing file.
pub mod shard {
    /// Hex length of the full SHA-1 digest.
    pub const DIGEST_HEX_LEN: usize = 40;
    /// Hex characters consumed by each of the two directory levels.
    pub const DIR_LEVEL_LEN: usize = 2;
}

/// Constants bounding accepted `YYYYMM` period values.
pub mod period {
    /// Earliest year the source dataset exists for.
    pub const MIN_YEAR: u32 = 2000;
    /// Latest representable year in a six-digit period.
    pub const MAX_YEAR: u32 = 9999;
}
