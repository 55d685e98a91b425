/// Lowercase host string used as the external key for a record.
/// Examples: `example.com`, `en.wikipedia.org`
pub type Domain = String;
/// Coarse date key identifying one snapshot of the source dataset,
/// encoded as `YYYYMM`. Examples: `202401`, `202502`
pub type Period = u32;
/// Numeric popularity rank (lower is more popular).
/// Examples: `1`, `500000`
pub type Rank = u64;
