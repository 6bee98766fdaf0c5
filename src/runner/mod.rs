//! Orchestrates a single archival run
//!
//! Thin wiring over the components: enumerate candidates, narrow to the
//! changed set when incremental, write the archive, persist the manifest,
//! record the outcome, prune old archives. One invocation drives exactly
//! one run; overlapping runs are fenced only by the advisory lock.

mod lock;

pub use lock::RunLock;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::archive::{self, ArchiveReport};
use crate::audit::{AuditEntry, AuditLogger, AUDIT_LOG_NAME};
use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, ArchiveResult};
use crate::filter::{self, PathFilter};
use crate::manifest::{FileEntry, Manifest, MANIFEST_NAME};

/// What a completed run did
#[derive(Debug)]
pub struct RunSummary {
    /// Path of the created archive; absent for dry runs
    pub archive_path: Option<PathBuf>,
    /// Name the archive was (to be) written under
    pub archive_name: String,
    /// Number of entries in the archive
    pub file_count: usize,
    /// Size of the archive on disk
    pub size_bytes: u64,
    /// Wall-clock duration of archive creation
    pub duration_ms: u128,
    /// Archives removed (or slated for removal, in dry-run) by retention
    pub pruned: Vec<PathBuf>,
}

/// Execute one archival run against a resolved configuration.
pub fn run(config: &ArchiveConfig) -> ArchiveResult<RunSummary> {
    run_at(config, Local::now())
}

fn run_at(config: &ArchiveConfig, now: DateTime<Local>) -> ArchiveResult<RunSummary> {
    config.validate()?;

    if !config.dry_run {
        fs::create_dir_all(&config.output_dir).map_err(|e| {
            ArchiveError::Io(format!(
                "Failed to create output directory {}: {}",
                config.output_dir.display(),
                e
            ))
        })?;
    }

    // Canonical roots keep the built-in exclusion checks exact even when the
    // configuration carries relative or symlinked paths.
    let log_dir = fs::canonicalize(&config.log_directory)?;
    let output_dir = canonicalize_best_effort(&config.output_dir);
    let audit_path = output_dir.join(AUDIT_LOG_NAME);
    let manifest_path = output_dir.join(MANIFEST_NAME);

    let archive_name = archive::archive_name(&now, config.compression);

    let path_filter = PathFilter::new(
        &log_dir,
        &output_dir,
        &audit_path,
        &config.include_patterns,
        &config.exclude_patterns,
    )?;
    let candidates = path_filter.enumerate()?;

    let mut fingerprints = BTreeMap::new();
    for path in &candidates {
        let rel = filter::relative_name(&log_dir, path).ok_or_else(|| {
            ArchiveError::Io(format!("{} is outside the log directory", path.display()))
        })?;
        fingerprints.insert(rel, FileEntry::fingerprint(path, config.hash_fingerprint)?);
    }

    let selection: Vec<PathBuf> = if config.incremental {
        let manifest = Manifest::load(&manifest_path);
        let changed = manifest.changed_set(&fingerprints);
        candidates
            .iter()
            .filter(|path| {
                filter::relative_name(&log_dir, path)
                    .map(|rel| changed.contains(&rel))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    } else {
        candidates.clone()
    };

    info!(
        "found {} candidate files, {} selected for {}",
        candidates.len(),
        selection.len(),
        archive_name
    );
    list_selection(&log_dir, &selection);

    if config.dry_run {
        let pruned = match &config.retention {
            Some(policy) => policy.apply(&output_dir, true)?,
            None => Vec::new(),
        };
        info!("dry run complete, no changes made");
        return Ok(RunSummary {
            archive_path: None,
            archive_name,
            file_count: selection.len(),
            size_bytes: 0,
            duration_ms: 0,
            pruned,
        });
    }

    let _lock = RunLock::acquire(&output_dir)?;
    let logger = AuditLogger::new(audit_path);
    let archive_path = output_dir.join(&archive_name);

    match write_archive(config, &log_dir, &archive_path, &selection, fingerprints, &manifest_path) {
        Ok((report, size_bytes)) => {
            logger.append(&AuditEntry::success(
                now,
                &archive_name,
                report.file_count,
                size_bytes,
                report.duration_ms,
            ))?;

            let pruned = match &config.retention {
                Some(policy) => policy.apply(&output_dir, false)?,
                None => Vec::new(),
            };

            info!(
                "created {} ({} files, {}, {} ms)",
                archive_path.display(),
                report.file_count,
                crate::audit::human_size(size_bytes),
                report.duration_ms
            );

            Ok(RunSummary {
                archive_path: Some(archive_path),
                archive_name,
                file_count: report.file_count,
                size_bytes,
                duration_ms: report.duration_ms,
                pruned,
            })
        }
        Err(e) => {
            // Best-effort audit record before surfacing the failure.
            let entry = AuditEntry::failure(now, &archive_name, e.to_string());
            if let Err(audit_err) = logger.append(&entry) {
                warn!("failed to write audit record: {}", audit_err);
            }
            Err(e)
        }
    }
}

/// Create the archive, verify it, and persist the rebuilt manifest.
fn write_archive(
    config: &ArchiveConfig,
    log_dir: &Path,
    archive_path: &Path,
    selection: &[PathBuf],
    fingerprints: BTreeMap<String, FileEntry>,
    manifest_path: &Path,
) -> ArchiveResult<(ArchiveReport, u64)> {
    let report = archive::create(
        log_dir,
        selection,
        archive_path,
        config.compression,
        config.compression_level,
        config.threads,
    )?;

    let (entry_count, size_bytes) = archive::inspect(archive_path, config.compression)?;

    // The manifest reflects the state as of this (successful) archive, built
    // from the full candidate set regardless of mode.
    Manifest::from_entries(fingerprints).save(manifest_path)?;

    Ok((
        ArchiveReport {
            file_count: entry_count,
            duration_ms: report.duration_ms,
        },
        size_bytes,
    ))
}

fn list_selection(log_dir: &Path, selection: &[PathBuf]) {
    for path in selection.iter().take(50) {
        if let Some(rel) = filter::relative_name(log_dir, path) {
            debug!("  + {}", rel);
        }
    }
    if selection.len() > 50 {
        debug!("  + ... {} more", selection.len() - 50);
    }
}

fn canonicalize_best_effort(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent)
            .map(|p| p.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}
