use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use log_archive::archive::Compression;
use log_archive::config::{ArchiveConfig, ConfigFile};
use log_archive::error::{ArchiveError, ArchiveResult};
use log_archive::retention::RetentionPolicy;
use log_archive::runner;

#[derive(Parser)]
#[command(
    name = "log-archive",
    author = "Kaylee Beyene",
    version,
    about = "Archive logs into a timestamped, compressed container",
    long_about = "log-archive packages a directory of log files into a \
                  timestamped tar container, optionally archiving only files \
                  changed since the last run, prunes old archives by age or \
                  count, and appends an audit entry for every run."
)]
struct Cli {
    /// Directory containing logs to archive (optional if provided via config)
    log_directory: Option<PathBuf>,

    /// Path to a TOML config file. If omitted, searches XDG paths.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory where archives and the audit log are stored
    /// (default: <log_directory>/archives)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Delete archives older than N days
    #[arg(long, value_name = "DAYS", group = "retention")]
    retention_days: Option<u32>,

    /// Keep only the most recent N archives
    #[arg(long, value_name = "COUNT", group = "retention")]
    retention_count: Option<usize>,

    /// Comma-separated glob patterns to include
    #[arg(long, value_delimiter = ',', value_name = "PATTERNS")]
    include: Vec<String>,

    /// Comma-separated glob patterns to exclude
    #[arg(long, value_delimiter = ',', value_name = "PATTERNS")]
    exclude: Vec<String>,

    /// Compression codec for the archive container
    #[arg(long, value_enum)]
    compression: Option<Compression>,

    /// Compression level (gzip 0-9, zstd 1-21)
    #[arg(long, value_name = "LEVEL")]
    compression_level: Option<i32>,

    /// Worker threads for parallel compression
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Archive only files changed since the last successful run
    #[arg(long)]
    incremental: bool,

    /// Fingerprint files by content hash instead of size and mtime
    #[arg(long)]
    hash: bool,

    /// Show planned actions without writing
    #[arg(long)]
    dry_run: bool,

    /// Verbose console output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_code(&e);
        }
    };

    match runner::run(&config) {
        Ok(summary) => {
            if let Some(path) = &summary.archive_path {
                println!(
                    "Created {} ({} files, {}, {} ms)",
                    path.display(),
                    summary.file_count,
                    log_archive::audit::human_size(summary.size_bytes),
                    summary.duration_ms
                );
            } else {
                println!(
                    "Dry run complete. {} files would be archived, {} archives pruned.",
                    summary.file_count,
                    summary.pruned.len()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// Merge CLI flags over config-file values into the typed configuration.
///
/// This is the single resolution step: after it returns, nothing re-reads
/// the environment or any config source.
fn resolve_config(cli: &Cli) -> ArchiveResult<ArchiveConfig> {
    let file = ConfigFile::load_discovered(cli.config.as_deref());

    let log_directory = cli
        .log_directory
        .clone()
        .or(file.log_directory)
        .ok_or_else(|| {
            ArchiveError::Config("log_directory not provided (CLI or config)".to_string())
        })?;

    let output_dir =
        ArchiveConfig::resolve_output_dir(&log_directory, cli.output_dir.clone().or(file.output_dir));

    let include_patterns = if cli.include.is_empty() {
        file.include
    } else {
        cli.include.clone()
    };
    let exclude_patterns = if cli.exclude.is_empty() {
        file.exclude
    } else {
        cli.exclude.clone()
    };

    // CLI retention flags override the config file as a pair: setting either
    // on the command line disables both file values.
    let (days, count) = if cli.retention_days.is_some() || cli.retention_count.is_some() {
        (cli.retention_days, cli.retention_count)
    } else {
        (file.retention_days, file.retention_count)
    };
    let retention = RetentionPolicy::from_options(days, count)?;

    Ok(ArchiveConfig {
        log_directory,
        output_dir,
        include_patterns,
        exclude_patterns,
        retention,
        compression: cli.compression.or(file.compression).unwrap_or_default(),
        compression_level: cli.compression_level.or(file.compression_level),
        threads: cli.threads.or(file.threads).unwrap_or(1),
        incremental: cli.incremental || file.incremental.unwrap_or(false),
        hash_fingerprint: cli.hash || file.hash.unwrap_or(false),
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    })
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(e: &ArchiveError) -> ExitCode {
    ExitCode::from(e.exit_code() as u8)
}
