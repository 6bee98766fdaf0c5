//! Archive container construction
//!
//! Builds the timestamped tar container for a run. The codec decides the
//! extension; the writer guarantees that no partial archive is ever visible
//! at its final name.

pub mod codec;
pub mod writer;

pub use codec::Compression;
pub use writer::{create, inspect, ArchiveReport};

use chrono::{DateTime, Local};

/// Common prefix of every archive file name
pub const ARCHIVE_PREFIX: &str = "logs_archive_";

/// Archive file name for a run started at `now`.
///
/// Second resolution keeps names monotonically increasing across runs.
pub fn archive_name(now: &DateTime<Local>, compression: Compression) -> String {
    format!(
        "{}{}{}",
        ARCHIVE_PREFIX,
        now.format("%Y%m%d_%H%M%S"),
        compression.extension()
    )
}
