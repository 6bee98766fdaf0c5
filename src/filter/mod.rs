//! Candidate file enumeration and filtering
//!
//! Walks the log directory and selects the files eligible for archiving.
//! The output directory and the audit log are always excluded, regardless
//! of user-supplied patterns, so an archive can never swallow its own
//! output. Enumeration order is deterministic (sorted by relative path) so
//! archives are reproducible for a fixed filesystem state.

pub mod patterns;

use std::path::{Path, PathBuf};

use globset::GlobSet;
use walkdir::WalkDir;

use crate::error::{ArchiveError, ArchiveResult};

/// Enumerates and filters candidate files under a root directory
pub struct PathFilter {
    root: PathBuf,
    output_dir: PathBuf,
    audit_log: PathBuf,
    include: GlobSet,
    include_is_empty: bool,
    exclude: GlobSet,
}

impl PathFilter {
    /// Build a filter rooted at `root`.
    ///
    /// `output_dir` and `audit_log` become built-in exclusions. Patterns are
    /// compiled eagerly so invalid globs fail before any filesystem work.
    pub fn new(
        root: &Path,
        output_dir: &Path,
        audit_log: &Path,
        include_patterns: &[String],
        exclude_patterns: &[String],
    ) -> ArchiveResult<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            audit_log: audit_log.to_path_buf(),
            include: patterns::build_set(include_patterns)?,
            include_is_empty: include_patterns.is_empty(),
            exclude: patterns::build_set(exclude_patterns)?,
        })
    }

    /// Walk the root and return all candidate files, sorted by relative path.
    ///
    /// Directories are never yielded; symlinks are not followed. Subtrees
    /// under the output directory are pruned without descending.
    pub fn enumerate(&self) -> ArchiveResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut walker = WalkDir::new(&self.root).follow_links(false).into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry
                .map_err(|e| ArchiveError::Io(format!("Failed to walk directory: {}", e)))?;
            let path = entry.path();

            if entry.file_type().is_dir() {
                if path != self.root && self.is_builtin_excluded(path) {
                    walker.skip_current_dir();
                }
                continue;
            }

            if self.should_exclude(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort_by_key(|p| relative_name(&self.root, p).unwrap_or_default());
        Ok(files)
    }

    /// Apply exclusion rules to a single file path.
    ///
    /// Built-in exclusions short-circuit first, then exclude patterns, then
    /// the include list (a non-empty include list rejects anything it does
    /// not match).
    pub fn should_exclude(&self, path: &Path) -> bool {
        if self.is_builtin_excluded(path) {
            return true;
        }

        let rel = match relative_name(&self.root, path) {
            Some(rel) => rel,
            None => return true,
        };

        if self.exclude.is_match(&rel) {
            return true;
        }

        if !self.include_is_empty && !self.include.is_match(&rel) {
            return true;
        }

        false
    }

    fn is_builtin_excluded(&self, path: &Path) -> bool {
        path.starts_with(&self.output_dir) || path == self.audit_log
    }

    /// The root this filter enumerates under
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Root-relative path as a `/`-separated string, independent of platform.
pub fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
