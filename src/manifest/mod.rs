//! Persisted manifest of per-file fingerprints and the incremental diff
//!
//! The manifest is a JSON mapping from root-relative path to fingerprint,
//! stored in the output directory. It reflects the state as of the last
//! successful archive only: it is rebuilt from the full candidate set and
//! persisted atomically after every archive, regardless of mode.
//!
//! A missing or unreadable manifest is never an error. Corruption degrades
//! to "treat as first run", which makes the next incremental run a full one.

mod entry;

pub use entry::FileEntry;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ArchiveResult;
use crate::storage;

/// Name of the manifest file inside the output directory
pub const MANIFEST_NAME: &str = "manifest.json";

/// Snapshot of per-file fingerprints from the last successful archive
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, FileEntry>,
}

impl Manifest {
    /// Load the manifest at `path`.
    ///
    /// Returns an empty manifest if the file is absent or fails to parse;
    /// parse failures emit a warning but never propagate to the caller.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&contents) {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!(
                    "manifest {} is unreadable ({}); treating as first run",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Build a manifest from a full set of current fingerprints.
    pub fn from_entries(entries: BTreeMap<String, FileEntry>) -> Self {
        Self { entries }
    }

    /// Persist atomically (write-to-temp-then-rename).
    pub fn save(&self, path: &Path) -> ArchiveResult<()> {
        storage::write_json_atomic(path, self)
    }

    /// Relative paths whose fingerprint is absent from this manifest or
    /// differs from the recorded one.
    pub fn changed_set(&self, current: &BTreeMap<String, FileEntry>) -> BTreeSet<String> {
        current
            .iter()
            .filter(|(rel, entry)| match self.entries.get(*rel) {
                Some(old) => entry.differs_from(old),
                None => true,
            })
            .map(|(rel, _)| rel.clone())
            .collect()
    }

    /// Fingerprint recorded for a relative path, if any
    pub fn get(&self, rel: &str) -> Option<&FileEntry> {
        self.entries.get(rel)
    }

    /// Number of recorded files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest records no files
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
