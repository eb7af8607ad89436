//! Content fingerprints for change detection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Chunk size used when streaming a file through the hasher
const CHUNK_SIZE: usize = 4096;

/// Hex-encoded digest of a file's full byte content
///
/// The empty string is reserved as the sentinel for "no fingerprint"
/// (missing or unreadable file). A real digest is never empty, so the
/// sentinel can never match a cached entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The sentinel returned for paths that are not readable regular files
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(hex: String) -> Self {
        Self(hex)
    }
}

/// Compute the blake3 fingerprint of a file
///
/// Never fails: anything that is not a readable regular file yields
/// [`Fingerprint::empty`].
pub fn fingerprint(path: &Path) -> Fingerprint {
    if !path.is_file() {
        return Fingerprint::empty();
    }

    match hash_file(path) {
        Ok(fp) => fp,
        Err(e) => {
            tracing::debug!("Could not read {}: {}", path.display(), e);
            Fingerprint::empty()
        }
    }
}

fn hash_file(path: &Path) -> std::io::Result<Fingerprint> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Fingerprint(hasher.finalize().to_hex().to_string()))
}
