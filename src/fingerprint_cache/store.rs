//! Persisted path -> fingerprint map

use crate::fingerprint_cache::fingerprint::Fingerprint;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Cache file used by the `convert` command, relative to the input directory
pub const CONVERT_CACHE_FILE: &str = ".diagrams.net.json";

/// Cache file used by the `normalize` command, relative to the input directory
pub const NORMALIZE_CACHE_FILE: &str = ".diagrams.net.normalized.json";

/// Maps a file path to the string used as its cache key
pub type KeyFn = fn(&Path) -> String;

/// Canonical absolute path string, or the path as given if it can't be resolved
pub fn canonical_key(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// Record of the last successfully processed content of each file
///
/// Loaded once, mutated in memory and written back wholesale by
/// [`FingerprintCache::persist`]. Nothing touches the file in between.
#[derive(Debug, Clone)]
pub struct FingerprintCache {
    path: PathBuf,
    key_fn: KeyFn,
    entries: BTreeMap<String, Fingerprint>,
}

impl FingerprintCache {
    /// Open `<dir>/<file_name>`, starting empty if the file doesn't exist
    ///
    /// A cache file that exists but is not a flat JSON object of strings is
    /// an error; it is not silently discarded.
    pub fn open(dir: &Path, file_name: &str) -> Result<Self> {
        Self::open_with_key(dir, file_name, canonical_key)
    }

    pub fn open_with_key(dir: &Path, file_name: &str, key_fn: KeyFn) -> Result<Self> {
        let path = dir.join(file_name);
        let entries: BTreeMap<String, Fingerprint> = if path.is_file() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read cache file: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse cache file: {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        tracing::debug!("Loaded {} cache entries from {}", entries.len(), path.display());

        Ok(Self {
            path,
            key_fn,
            entries,
        })
    }

    /// Location the cache is persisted to
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self, file: &Path) -> String {
        (self.key_fn)(file)
    }

    pub fn get(&self, file: &Path) -> Option<&Fingerprint> {
        self.entries.get(&self.key(file))
    }

    /// True if `file` was last processed with exactly this content
    ///
    /// The empty sentinel never counts as current.
    pub fn is_current(&self, file: &Path, fingerprint: &Fingerprint) -> bool {
        !fingerprint.is_empty() && self.get(file) == Some(fingerprint)
    }

    pub fn record(&mut self, file: &Path, fingerprint: Fingerprint) {
        let key = self.key(file);
        self.entries.insert(key, fingerprint);
    }

    /// Forget every entry so the next run reprocesses everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the whole map to the cache file, replacing its previous content
    ///
    /// Written to a sibling temp file first and renamed over the old one, so
    /// an interrupted write leaves the previous cache intact.
    pub fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize cache")?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write cache file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace cache file: {}", self.path.display()))?;

        tracing::debug!("Wrote {} cache entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}
