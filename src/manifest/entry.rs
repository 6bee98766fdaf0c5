//! Per-file fingerprints recorded in the manifest

use std::fs::{self, File};
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ArchiveError, ArchiveResult};

/// Fingerprint of a single candidate file.
///
/// Size and mtime form the default fingerprint; the content hash is an
/// opt-in stronger mode that costs a full read of the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Size in bytes
    pub size: u64,
    /// Modification time as unix seconds
    pub mtime: i64,
    /// SHA-256 content hash (hex), present only in hash mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl FileEntry {
    /// Fingerprint the file at `path`.
    ///
    /// Symlinks are fingerprinted from their own metadata, never from the
    /// link target, and are never content-hashed.
    pub fn fingerprint(path: &Path, hash_contents: bool) -> ArchiveResult<Self> {
        let meta = fs::symlink_metadata(path).map_err(|e| {
            ArchiveError::Io(format!("Failed to stat {}: {}", path.display(), e))
        })?;

        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let hash = if hash_contents && meta.is_file() {
            Some(hash_file(path)?)
        } else {
            None
        };

        Ok(Self {
            size: meta.len(),
            mtime,
            hash,
        })
    }

    /// Whether this fingerprint differs from a previously recorded one.
    ///
    /// When both sides carry a content hash, the hash is authoritative and
    /// mtime churn alone does not count as a change.
    pub fn differs_from(&self, old: &FileEntry) -> bool {
        if self.size != old.size {
            return true;
        }
        match (&self.hash, &old.hash) {
            (Some(new_hash), Some(old_hash)) => new_hash != old_hash,
            _ => self.mtime != old.mtime,
        }
    }
}

fn hash_file(path: &Path) -> ArchiveResult<String> {
    let mut file = File::open(path)
        .map_err(|e| ArchiveError::Io(format!("Failed to open {}: {}", path.display(), e)))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)
        .map_err(|e| ArchiveError::Io(format!("Failed to hash {}: {}", path.display(), e)))?;
    Ok(format!("{:x}", hasher.finalize()))
}
