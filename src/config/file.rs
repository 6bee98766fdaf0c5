//! TOML config file loading and discovery
//!
//! This is collaborator territory: it runs once in `main.rs`, before the
//! typed `ArchiveConfig` is built, and the core never touches it.
//!
//! ## Discovery order
//!
//! 1. `--config` path if provided
//! 2. `$LOG_ARCHIVE_CONFIG` if set (file path)
//! 3. XDG config dir: `~/.config/log-archive/config.toml` (or platform
//!    equivalent via the `directories` crate)

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::warn;

use crate::archive::Compression;

/// Environment variable naming an explicit config file path
pub const CONFIG_PATH_ENV: &str = "LOG_ARCHIVE_CONFIG";

/// Raw values read from a config file; every field is optional and the CLI
/// wins on conflict.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub log_directory: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub retention_days: Option<u32>,
    pub retention_count: Option<usize>,
    pub compression: Option<Compression>,
    pub compression_level: Option<i32>,
    pub threads: Option<usize>,
    pub incremental: Option<bool>,
    pub hash: Option<bool>,
}

impl ConfigFile {
    /// Load the first discovered config file, or defaults when none exists.
    ///
    /// An unreadable or unparsable file degrades to defaults with a warning;
    /// configuration problems are reported later, against the typed object.
    pub fn load_discovered(explicit: Option<&Path>) -> Self {
        match discover(explicit) {
            Some(path) => Self::load(&path),
            None => Self::default(),
        }
    }

    fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("could not read config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("could not parse config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// First existing config file in discovery order.
pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.is_file() {
            return Some(path);
        }
    }

    if let Some(dirs) = ProjectDirs::from("", "", "log-archive") {
        let path = dirs.config_dir().join("config.toml");
        if path.is_file() {
            return Some(path);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_full_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
log_directory = "/var/log/app"
output_dir = "/srv/archives"
include = ["*.log"]
exclude = ["*.tmp", "debug/**"]
retention_count = 5
compression = "zstd"
compression_level = 7
threads = 4
incremental = true
"#,
        )
        .unwrap();

        let config = ConfigFile::load_discovered(Some(&path));
        assert_eq!(config.log_directory.unwrap(), PathBuf::from("/var/log/app"));
        assert_eq!(config.include, vec!["*.log"]);
        assert_eq!(config.exclude.len(), 2);
        assert_eq!(config.retention_count, Some(5));
        assert_eq!(config.compression, Some(Compression::Zstd));
        assert_eq!(config.compression_level, Some(7));
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.incremental, Some(true));
        assert!(config.hash.is_none());
    }

    #[test]
    fn test_unparsable_file_degrades_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "this is not toml = [").unwrap();

        let config = ConfigFile::load_discovered(Some(&path));
        assert!(config.log_directory.is_none());
        assert!(config.include.is_empty());
    }

    #[test]
    fn test_missing_file_degrades_to_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_discovered(Some(&temp.path().join("absent.toml")));
        assert!(config.log_directory.is_none());
    }

    #[test]
    fn test_explicit_path_wins_discovery() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("explicit.toml");
        fs::write(&path, "threads = 2").unwrap();

        assert_eq!(discover(Some(&path)).unwrap(), path);
    }
}
