//! Advisory lock over the output directory
//!
//! Overlapping runs against the same output directory can race on the
//! manifest and retention steps. The lock turns that race into a fast
//! failure instead of silent corruption; it is advisory only and does not
//! protect against external writers.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ArchiveError, ArchiveResult};

/// Name of the lock file inside the output directory
pub const LOCK_NAME: &str = ".log-archive.lock";

/// Held for the duration of a run; released (deleted) on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Take the lock, failing fast if another run appears to hold it.
    pub fn acquire(output_dir: &Path) -> ArchiveResult<Self> {
        let path = output_dir.join(LOCK_NAME);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    ArchiveError::Lock(format!(
                        "{} exists; another run appears to be in progress",
                        path.display()
                    ))
                } else {
                    ArchiveError::from(e)
                }
            })?;

        // Record the owning pid for operators; nothing reads this back.
        let _ = writeln!(file, "{}", std::process::id());

        Ok(Self { path })
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
