//! End-to-end tests for the log-archive binary

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sample_tree(temp: &TempDir) -> PathBuf {
    let log_dir = temp.path().join("logs");
    fs::create_dir(&log_dir).unwrap();
    fs::write(log_dir.join("app.log"), "alpha\n").unwrap();
    fs::write(log_dir.join("system.log"), "beta\n").unwrap();
    log_dir
}

fn cmd(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("log-archive").unwrap();
    // Keep config discovery away from the host environment.
    cmd.env_remove("LOG_ARCHIVE_CONFIG");
    cmd.env("XDG_CONFIG_HOME", temp.path().join("xdg"));
    cmd.env("HOME", temp.path());
    cmd
}

fn list_archives(output_dir: &Path) -> Vec<String> {
    fs::read_dir(output_dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| name.starts_with("logs_archive_"))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_basic_run_creates_archive_and_audit_log() {
    let temp = TempDir::new().unwrap();
    let log_dir = sample_tree(&temp);

    cmd(&temp)
        .arg(&log_dir)
        .args(["--compression", "none"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"))
        .stdout(predicate::str::contains("2 files"));

    let output_dir = log_dir.join("archives");
    let archives = list_archives(&output_dir);
    assert_eq!(archives.len(), 1);
    assert!(archives[0].ends_with(".tar"));

    let audit = fs::read_to_string(output_dir.join("archive.log")).unwrap();
    assert!(audit.contains("files=2"));
    assert!(audit.contains("duration_ms="));

    let manifest = fs::read_to_string(output_dir.join("manifest.json")).unwrap();
    assert!(manifest.contains("app.log"));
}

#[test]
fn test_missing_log_directory_exits_2() {
    let temp = TempDir::new().unwrap();

    cmd(&temp)
        .arg(temp.path().join("does-not-exist"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn test_no_log_directory_anywhere_exits_2() {
    let temp = TempDir::new().unwrap();

    cmd(&temp)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("log_directory not provided"));
}

#[test]
fn test_conflicting_retention_flags_exit_2() {
    let temp = TempDir::new().unwrap();
    let log_dir = sample_tree(&temp);

    cmd(&temp)
        .arg(&log_dir)
        .args(["--retention-days", "7", "--retention-count", "3"])
        .assert()
        .code(2);
}

#[test]
fn test_zero_retention_count_exits_2() {
    let temp = TempDir::new().unwrap();
    let log_dir = sample_tree(&temp);

    cmd(&temp)
        .arg(&log_dir)
        .args(["--retention-count", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("positive integer"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let log_dir = sample_tree(&temp);

    cmd(&temp)
        .arg(&log_dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run complete"));

    assert!(!log_dir.join("archives").exists());
}

#[test]
fn test_incremental_second_run_archives_nothing() {
    let temp = TempDir::new().unwrap();
    let log_dir = sample_tree(&temp);

    cmd(&temp)
        .arg(&log_dir)
        .args(["--compression", "none", "--incremental"])
        .assert()
        .success();

    cmd(&temp)
        .arg(&log_dir)
        .args(["--compression", "none", "--incremental"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 files"));

    let output_dir = log_dir.join("archives");
    assert!(output_dir.join("manifest.json").exists());

    let audit = fs::read_to_string(output_dir.join("archive.log")).unwrap();
    let lines: Vec<&str> = audit.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("files=2"));
    assert!(lines[1].contains("files=0"));
}

#[test]
fn test_include_pattern_from_cli() {
    let temp = TempDir::new().unwrap();
    let log_dir = sample_tree(&temp);
    fs::write(log_dir.join("notes.txt"), "not a log\n").unwrap();

    cmd(&temp)
        .arg(&log_dir)
        .args(["--compression", "none", "--include", "*.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 files"));
}

#[test]
fn test_config_file_supplies_log_directory() {
    let temp = TempDir::new().unwrap();
    let log_dir = sample_tree(&temp);

    let config_path = temp.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "log_directory = {:?}\ncompression = \"none\"\n",
            log_dir.to_string_lossy()
        ),
    )
    .unwrap();

    cmd(&temp)
        .args(["--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 files"));

    assert_eq!(list_archives(&log_dir.join("archives")).len(), 1);
}

#[test]
fn test_retention_count_via_binary() {
    let temp = TempDir::new().unwrap();
    let log_dir = sample_tree(&temp);
    let output_dir = log_dir.join("archives");

    // Pre-seed two stale archives with old names; the run adds a third and
    // retention keeps only the most recent one.
    fs::create_dir_all(&output_dir).unwrap();
    for name in [
        "logs_archive_20200101_000000.tar",
        "logs_archive_20200102_000000.tar",
    ] {
        fs::write(output_dir.join(name), "old").unwrap();
    }

    cmd(&temp)
        .arg(&log_dir)
        .args(["--compression", "none", "--retention-count", "1"])
        .assert()
        .success();

    assert_eq!(list_archives(&output_dir).len(), 1);
}
