//! Compression codec selection
//!
//! The codec owns the archive file extension and the valid level range, so
//! the rest of the crate never pattern-matches on extensions.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Compression applied to the tar container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Plain tar, no compression
    None,
    /// Gzip (.tar.gz), the default
    #[default]
    Gzip,
    /// Zstandard (.tar.zst)
    Zstd,
}

impl Compression {
    /// All codecs, used when scanning the output directory for archives
    pub const ALL: [Compression; 3] = [Compression::None, Compression::Gzip, Compression::Zstd];

    /// Archive file extension for this codec
    pub fn extension(&self) -> &'static str {
        match self {
            Compression::None => ".tar",
            Compression::Gzip => ".tar.gz",
            Compression::Zstd => ".tar.zst",
        }
    }

    /// Valid compression level range, if the codec is tunable
    pub fn level_range(&self) -> Option<RangeInclusive<i32>> {
        match self {
            Compression::None => None,
            Compression::Gzip => Some(0..=9),
            Compression::Zstd => Some(1..=21),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}
