//! Audit logger for the append-only audit log
//!
//! One line per run, flushed immediately on write. The log lives inside the
//! output directory and is a built-in enumeration exclusion, so it can never
//! end up inside an archive.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{ArchiveError, ArchiveResult};

use super::entry::AuditEntry;

/// Handles writing audit entries to the audit log file
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new AuditLogger that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append one entry and flush immediately.
    pub fn append(&self, entry: &AuditEntry) -> ArchiveResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| ArchiveError::Io(format!("Failed to open audit log: {}", e)))?;

        writeln!(file, "{}", entry)
            .map_err(|e| ArchiveError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| ArchiveError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Read all audit lines, oldest first. Used by tests and tooling.
    pub fn read_all(&self) -> ArchiveResult<Vec<String>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| ArchiveError::Io(format!("Failed to open audit log: {}", e)))?;

        let reader = BufReader::new(file);
        let mut lines = Vec::new();
        for line in reader.lines() {
            let line =
                line.map_err(|e| ArchiveError::Io(format!("Failed to read audit log: {}", e)))?;
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }

        Ok(lines)
    }

    /// Check if the audit log file exists
    pub fn exists(&self) -> bool {
        self.log_path.exists()
    }

    /// Get the path to the audit log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}
