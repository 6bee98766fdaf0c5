//! Configuration for log-archive
//!
//! `resolved` holds the typed, validated configuration object the core
//! consumes; `file` is the collaborator-side TOML loading that feeds it.

pub mod file;
pub mod resolved;

pub use file::ConfigFile;
pub use resolved::ArchiveConfig;
