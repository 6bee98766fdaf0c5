//! Audit entry data structures
//!
//! One entry per run. Success entries carry file count, human-readable size
//! and duration; failure entries carry the error description and still name
//! the archive the run was attempting to produce.

use std::fmt;

use chrono::{DateTime, Local};

/// Outcome of a single archival run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Archive was produced
    Success {
        file_count: usize,
        size_bytes: u64,
        duration_ms: u128,
    },
    /// Run failed; the archive may never have been produced
    Failure { error: String },
}

/// A single audit log line
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// When the run started (local time, offset-aware)
    pub timestamp: DateTime<Local>,
    /// Name the archive was (to be) written under
    pub archive_name: String,
    /// What happened
    pub outcome: RunOutcome,
}

impl AuditEntry {
    /// Entry for a successful run
    pub fn success(
        timestamp: DateTime<Local>,
        archive_name: impl Into<String>,
        file_count: usize,
        size_bytes: u64,
        duration_ms: u128,
    ) -> Self {
        Self {
            timestamp,
            archive_name: archive_name.into(),
            outcome: RunOutcome::Success {
                file_count,
                size_bytes,
                duration_ms,
            },
        }
    }

    /// Entry for a failed run
    pub fn failure(
        timestamp: DateTime<Local>,
        archive_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            archive_name: archive_name.into(),
            outcome: RunOutcome::Failure {
                error: error.into(),
            },
        }
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let iso = self.timestamp.to_rfc3339();
        let local = self.timestamp.format("%Y-%m-%d %H:%M:%S");
        match &self.outcome {
            RunOutcome::Success {
                file_count,
                size_bytes,
                duration_ms,
            } => write!(
                f,
                "{} | local={} | archive={} | files={} | size={} | duration_ms={}",
                iso,
                local,
                self.archive_name,
                file_count,
                human_size(*size_bytes),
                duration_ms
            ),
            RunOutcome::Failure { error } => write!(
                f,
                "{} | local={} | archive={} | ERROR={}",
                iso, local, self.archive_name, error
            ),
        }
    }
}

/// Human-readable byte size: 1024 divisor, one decimal, B through TB.
pub fn human_size(num_bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = num_bytes as f64;
    for unit in UNITS {
        if size < 1024.0 || unit == "TB" {
            return format!("{:.1}{}", size, unit);
        }
        size /= 1024.0;
    }
    unreachable!("unit loop always returns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_success_line_format() {
        let entry = AuditEntry::success(
            fixed_now(),
            "logs_archive_20250102_030405.tar.gz",
            12,
            2048,
            37,
        );
        let line = entry.to_string();
        assert!(line.contains("local=2025-01-02 03:04:05"));
        assert!(line.contains("archive=logs_archive_20250102_030405.tar.gz"));
        assert!(line.contains("files=12"));
        assert!(line.contains("size=2.0KB"));
        assert!(line.contains("duration_ms=37"));
        assert!(!line.contains("ERROR"));
    }

    #[test]
    fn test_failure_line_format() {
        let entry = AuditEntry::failure(
            fixed_now(),
            "logs_archive_20250102_030405.tar.gz",
            "Permission error: denied",
        );
        let line = entry.to_string();
        assert!(line.contains("ERROR=Permission error: denied"));
        assert!(line.contains("archive=logs_archive_20250102_030405.tar.gz"));
        assert!(!line.contains("files="));
    }

    #[test]
    fn test_line_starts_with_iso_timestamp() {
        let entry = AuditEntry::failure(fixed_now(), "a.tar", "boom");
        let line = entry.to_string();
        assert!(line.starts_with("2025-01-02T03:04:05"));
    }

    #[test]
    fn test_human_size_units() {
        assert_eq!(human_size(0), "0.0B");
        assert_eq!(human_size(512), "512.0B");
        assert_eq!(human_size(1024), "1.0KB");
        assert_eq!(human_size(1536), "1.5KB");
        assert_eq!(human_size(1024 * 1024), "1.0MB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.0GB");
    }
}
