//! Retention policy over historical archives
//!
//! Scans the output directory for files matching the archive naming
//! convention and deletes the stale ones, either by age or by count.
//! Individual deletion failures are warnings: retention never fails a run.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{info, warn};

use crate::archive::{Compression, ARCHIVE_PREFIX};
use crate::error::{ArchiveError, ArchiveResult};

/// How stale archives are selected for deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Delete archives with a modification time older than `days` days
    Age { days: u32 },
    /// Keep only the `keep` most recently modified archives
    Count { keep: usize },
}

impl RetentionPolicy {
    /// Build a policy from the two mutually exclusive options.
    ///
    /// Both set, or a non-positive value, is a configuration error; neither
    /// set means no retention.
    pub fn from_options(days: Option<u32>, count: Option<usize>) -> ArchiveResult<Option<Self>> {
        match (days, count) {
            (Some(_), Some(_)) => Err(ArchiveError::Config(
                "retention_days and retention_count are mutually exclusive".to_string(),
            )),
            (Some(0), None) => Err(ArchiveError::Config(
                "retention_days must be a positive integer".to_string(),
            )),
            (None, Some(0)) => Err(ArchiveError::Config(
                "retention_count must be a positive integer".to_string(),
            )),
            (Some(days), None) => Ok(Some(Self::Age { days })),
            (None, Some(keep)) => Ok(Some(Self::Count { keep })),
            (None, None) => Ok(None),
        }
    }

    /// Compute the deletion set without touching the filesystem.
    pub fn plan(&self, output_dir: &Path) -> ArchiveResult<Vec<PathBuf>> {
        let archives = list_archives(output_dir)?;

        let to_delete = match *self {
            RetentionPolicy::Age { days } => {
                let cutoff = SystemTime::now() - Duration::from_secs(u64::from(days) * 86_400);
                archives
                    .into_iter()
                    .filter(|(_, mtime)| *mtime < cutoff)
                    .map(|(path, _)| path)
                    .collect()
            }
            RetentionPolicy::Count { keep } => {
                let total = archives.len();
                archives
                    .into_iter()
                    .take(total.saturating_sub(keep))
                    .map(|(path, _)| path)
                    .collect()
            }
        };

        Ok(to_delete)
    }

    /// Apply the policy; in dry-run mode only report what would be deleted.
    ///
    /// Returns the deletion set. Failures to delete an individual archive
    /// are logged and skipped.
    pub fn apply(&self, output_dir: &Path, dry_run: bool) -> ArchiveResult<Vec<PathBuf>> {
        let to_delete = self.plan(output_dir)?;

        for path in &to_delete {
            if dry_run {
                info!("retention: would delete {}", path.display());
                continue;
            }
            match fs::remove_file(path) {
                Ok(()) => info!("retention: deleted {}", path.display()),
                Err(e) => warn!("retention: failed to delete {}: {}", path.display(), e),
            }
        }

        Ok(to_delete)
    }
}

/// Archives in `output_dir`, sorted ascending by modification time.
pub fn list_archives(output_dir: &Path) -> ArchiveResult<Vec<(PathBuf, SystemTime)>> {
    if !output_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    let entries = fs::read_dir(output_dir).map_err(|e| {
        ArchiveError::Io(format!(
            "Failed to read output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    for entry in entries {
        let entry =
            entry.map_err(|e| ArchiveError::Io(format!("Failed to read directory entry: {}", e)))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_archive_name(&name) {
            continue;
        }
        let mtime = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        archives.push((path, mtime));
    }

    archives.sort_by_key(|(_, mtime)| *mtime);
    Ok(archives)
}

fn is_archive_name(name: &str) -> bool {
    name.starts_with(ARCHIVE_PREFIX)
        && Compression::ALL
            .iter()
            .any(|codec| name.ends_with(codec.extension()))
}
