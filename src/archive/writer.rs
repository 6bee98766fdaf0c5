//! Tar container construction with pluggable compression
//!
//! The container is built into a temporary file beside the destination and
//! renamed into place only on success, so a partial archive is never
//! observable at its final name. Entry order always matches the input file
//! order, even when a worker pool pre-reads file contents in parallel.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use rayon::prelude::*;
use tracing::debug;

use crate::archive::Compression;
use crate::error::{ArchiveError, ArchiveResult};
use crate::filter;

/// Outcome of a successful archive creation
#[derive(Debug, Clone, Copy)]
pub struct ArchiveReport {
    /// Number of entries written
    pub file_count: usize,
    /// Wall-clock duration of the whole create call
    pub duration_ms: u128,
}

/// Build a compressed container at `dest` from `files` (absolute paths under
/// `source_root`, already filtered and ordered).
///
/// Symlinks are stored as link entries with their target, never dereferenced.
pub fn create(
    source_root: &Path,
    files: &[PathBuf],
    dest: &Path,
    compression: Compression,
    level: Option<i32>,
    threads: usize,
) -> ArchiveResult<ArchiveReport> {
    let start = Instant::now();
    let tmp = temp_path(dest);

    match build(source_root, files, &tmp, compression, level, threads) {
        Ok(count) => {
            fs::rename(&tmp, dest).map_err(|e| {
                let _ = fs::remove_file(&tmp);
                ArchiveError::from(e)
            })?;
            Ok(ArchiveReport {
                file_count: count,
                duration_ms: start.elapsed().as_millis(),
            })
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

/// Re-open a finished archive and report (entry count, file size on disk).
///
/// Also serves as a smoke check that the container stays readable by
/// standard tar tooling.
pub fn inspect(path: &Path, compression: Compression) -> ArchiveResult<(usize, u64)> {
    let size = fs::metadata(path)?.len();
    let file = File::open(path)?;

    let reader: Box<dyn Read> = match compression {
        Compression::None => Box::new(file),
        Compression::Gzip => Box::new(GzDecoder::new(file)),
        Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(file)?),
    };

    let mut archive = tar::Archive::new(reader);
    let mut count = 0usize;
    for entry in archive.entries()? {
        entry?;
        count += 1;
    }

    Ok((count, size))
}

fn build(
    source_root: &Path,
    files: &[PathBuf],
    tmp: &Path,
    compression: Compression,
    level: Option<i32>,
    threads: usize,
) -> ArchiveResult<usize> {
    let mut prefetched = if threads > 1 && !files.is_empty() {
        prefetch(files, threads)?
    } else {
        vec![None; files.len()]
    };

    let file = File::create(tmp)?;
    let writer = BufWriter::new(file);

    match compression {
        Compression::None => {
            let (mut inner, count) = write_container(writer, source_root, files, &mut prefetched)?;
            inner.flush()?;
            Ok(count)
        }
        Compression::Gzip => {
            let gz_level = level.map(|l| l as u32).unwrap_or(6);
            let encoder = GzEncoder::new(writer, flate2::Compression::new(gz_level));
            let (encoder, count) = write_container(encoder, source_root, files, &mut prefetched)?;
            let mut inner = encoder.finish()?;
            inner.flush()?;
            Ok(count)
        }
        Compression::Zstd => {
            let encoder = zstd::stream::write::Encoder::new(writer, level.unwrap_or(3))?;
            let (encoder, count) = write_container(encoder, source_root, files, &mut prefetched)?;
            let mut inner = encoder.finish()?;
            inner.flush()?;
            Ok(count)
        }
    }
}

/// Append every file to a tar stream over `writer`, in input order.
fn write_container<W: Write>(
    writer: W,
    source_root: &Path,
    files: &[PathBuf],
    prefetched: &mut [Option<Vec<u8>>],
) -> ArchiveResult<(W, usize)> {
    let mut builder = tar::Builder::new(writer);
    builder.follow_symlinks(false);

    let mut count = 0usize;
    for (i, path) in files.iter().enumerate() {
        let rel = filter::relative_name(source_root, path).ok_or_else(|| {
            ArchiveError::Io(format!("{} is outside the source root", path.display()))
        })?;
        let meta = fs::symlink_metadata(path)?;

        if let (false, Some(data)) = (
            meta.file_type().is_symlink(),
            prefetched.get_mut(i).and_then(|d| d.take()),
        ) {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(entry_mode(&meta));
            header.set_mtime(unix_mtime(&meta));
            header.set_cksum();
            builder.append_data(&mut header, Path::new(&rel), data.as_slice())?;
        } else {
            // Symlinks land here and are stored as link entries.
            builder.append_path_with_name(path, Path::new(&rel))?;
        }
        count += 1;
    }

    let writer = builder.into_inner()?;
    Ok((writer, count))
}

/// Pre-read file contents on a bounded worker pool.
///
/// Results come back indexed by input position, so append order is
/// unaffected by worker scheduling. Read failures fall back to the
/// sequential path, which surfaces the real error.
fn prefetch(files: &[PathBuf], threads: usize) -> ArchiveResult<Vec<Option<Vec<u8>>>> {
    debug!("prefetching {} files on {} workers", files.len(), threads);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ArchiveError::Io(format!("Failed to build worker pool: {}", e)))?;

    Ok(pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let meta = fs::symlink_metadata(path).ok()?;
                if meta.is_file() {
                    fs::read(path).ok()
                } else {
                    None
                }
            })
            .collect()
    }))
}

fn temp_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|s| s.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

#[cfg(unix)]
fn entry_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn entry_mode(_meta: &fs::Metadata) -> u32 {
    0o644
}

fn unix_mtime(meta: &fs::Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
