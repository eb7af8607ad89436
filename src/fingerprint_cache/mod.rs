//! Incremental rebuild cache
//!
//! Tracks the content fingerprint each input file had when it was last
//! processed, so unchanged files can be skipped on the next run. The
//! `convert` and `normalize` commands each keep their own cache file.

pub mod fingerprint;
pub mod session;
pub mod store;

pub use fingerprint::{fingerprint, Fingerprint};
pub use session::{RunStats, RunSummary};
pub use store::{canonical_key, FingerprintCache, CONVERT_CACHE_FILE, NORMALIZE_CACHE_FILE};
