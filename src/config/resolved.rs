//! The validated configuration consumed by the archival core
//!
//! The core operates only on this typed object. Everything upstream of it
//! (CLI flags, config files, environment lookups) is resolved once by the
//! collaborator in `main.rs` and never re-read.

use std::path::{Path, PathBuf};

use crate::archive::Compression;
use crate::audit::AUDIT_LOG_NAME;
use crate::error::{ArchiveError, ArchiveResult};
use crate::manifest::MANIFEST_NAME;
use crate::retention::RetentionPolicy;

/// Default name of the output directory under the log directory
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "archives";

/// Fully resolved configuration for one archival run
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Directory containing the logs to archive
    pub log_directory: PathBuf,
    /// Directory where archives, manifest and audit log are stored
    pub output_dir: PathBuf,
    /// Glob patterns a candidate must match (empty = no restriction)
    pub include_patterns: Vec<String>,
    /// Glob patterns that exclude a candidate
    pub exclude_patterns: Vec<String>,
    /// Retention policy, if any
    pub retention: Option<RetentionPolicy>,
    /// Compression codec
    pub compression: Compression,
    /// Codec-specific compression level
    pub compression_level: Option<i32>,
    /// Worker threads for parallel compression
    pub threads: usize,
    /// Archive only files changed since the last successful run
    pub incremental: bool,
    /// Fingerprint files by content hash instead of size+mtime
    pub hash_fingerprint: bool,
    /// Report planned actions without writing anything
    pub dry_run: bool,
    /// Verbose console output
    pub verbose: bool,
}

impl ArchiveConfig {
    /// Resolve the output directory: explicit value, or
    /// `<log_directory>/archives`.
    pub fn resolve_output_dir(log_directory: &Path, output_dir: Option<PathBuf>) -> PathBuf {
        output_dir.unwrap_or_else(|| log_directory.join(DEFAULT_OUTPUT_DIR_NAME))
    }

    /// Path of the audit log inside the output directory
    pub fn audit_log_path(&self) -> PathBuf {
        self.output_dir.join(AUDIT_LOG_NAME)
    }

    /// Path of the manifest inside the output directory
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_NAME)
    }

    /// Check field constraints; called before any filesystem mutation.
    pub fn validate(&self) -> ArchiveResult<()> {
        if !self.log_directory.is_dir() {
            return Err(ArchiveError::Config(format!(
                "{} is not a directory",
                self.log_directory.display()
            )));
        }

        if self.threads == 0 {
            return Err(ArchiveError::Config(
                "threads must be a positive integer".to_string(),
            ));
        }

        // Compile both pattern lists so bad globs fail here, not mid-run.
        crate::filter::patterns::build_set(&self.include_patterns)?;
        crate::filter::patterns::build_set(&self.exclude_patterns)?;

        if let Some(level) = self.compression_level {
            match self.compression.level_range() {
                Some(range) if !range.contains(&level) => {
                    return Err(ArchiveError::Config(format!(
                        "compression level {} out of range {}..={} for {}",
                        level,
                        range.start(),
                        range.end(),
                        self.compression
                    )));
                }
                None => {
                    return Err(ArchiveError::Config(
                        "compression level requires gzip or zstd".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }
}
