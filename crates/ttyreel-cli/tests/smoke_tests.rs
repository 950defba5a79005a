//! Smoke tests for the ttyreel CLI
//!
//! These drive the real binary against small recording files.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const RECORDING: &str = r#"# The configurations that used for the recording, feel free to edit them
config:

  cols: 20
  rows: 4
  frameDelay: auto
  maxIdleTime: 50
  padding: 2

# Records, feel free to edit them
records:
  - delay: 10
    content: "hello\r\n"
  - delay: 900
    content: "\e[32mworld\e[0m"
  - delay: 20
    content: "!"
"#;

/// Get a command for the ttyreel binary
fn ttyreel() -> Command {
    Command::cargo_bin("ttyreel").expect("ttyreel binary should exist")
}

fn write_recording(dir: &Path) -> PathBuf {
    let path = dir.join("demo.yml");
    fs::write(&path, RECORDING).unwrap();
    path
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    ttyreel()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    ttyreel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("record"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_help_describes_quiet_flag() {
    ttyreel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quiet mode (suppress non-error output)"))
        .stdout(predicate::str::contains("render --quality").not());
}

#[test]
fn test_no_args_shows_help() {
    ttyreel().assert().failure();
}

#[test]
fn test_render_subcommand_help() {
    ttyreel()
        .args(["render", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--quality"))
        .stdout(predicate::str::contains("--step"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_writes_local_file() {
    let temp = TempDir::new().unwrap();
    ttyreel()
        .arg("config")
        .current_dir(temp.path())
        .assert()
        .success();
    let written = fs::read_to_string(temp.path().join("config.yml")).unwrap();
    assert!(written.contains("maxIdleTime"));
}

#[test]
fn test_init_writes_global_config() {
    let temp = TempDir::new().unwrap();
    ttyreel()
        .arg("init")
        .env("HOME", temp.path())
        .env_remove("APPDATA")
        .assert()
        .success();
    assert!(temp.path().join(".ttyreel").join("config.yml").is_file());
}

// ============================================================================
// Play Tests
// ============================================================================

#[test]
fn test_play_writes_frames_then_reset() {
    let temp = TempDir::new().unwrap();
    let recording = write_recording(temp.path());
    ttyreel()
        .arg("play")
        .arg(&recording)
        .args(["-s", "0.1"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("hello\r\n"))
        .stdout(predicate::str::contains("world"))
        .stdout(predicate::str::ends_with("!\x1bc"));
}

#[test]
fn test_play_without_extension() {
    let temp = TempDir::new().unwrap();
    write_recording(temp.path());
    ttyreel()
        .args(["play", "demo", "-s", "0.1"])
        .current_dir(temp.path())
        .assert()
        .success();
}

#[test]
fn test_play_rejects_zero_speed() {
    let temp = TempDir::new().unwrap();
    let recording = write_recording(temp.path());
    ttyreel()
        .arg("play")
        .arg(&recording)
        .args(["-s", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("speed factor"));
}

#[test]
fn test_play_missing_file() {
    let temp = TempDir::new().unwrap();
    ttyreel()
        .args(["play", "absent"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"))
        .stderr(predicate::str::contains("absent.yml"));
}

#[test]
fn test_play_invalid_recording() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.yml");
    fs::write(&path, "records: [").unwrap();
    ttyreel()
        .arg("play")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid recording"));
}

// ============================================================================
// Render / Generate Tests
// ============================================================================

#[test]
fn test_render_rejects_zero_step() {
    let temp = TempDir::new().unwrap();
    let recording = write_recording(temp.path());
    ttyreel()
        .arg("render")
        .arg(&recording)
        .args(["-s", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step"));
}

#[test]
fn test_render_writes_gif() {
    let temp = TempDir::new().unwrap();
    let recording = write_recording(temp.path());
    let output = temp.path().join("out.gif");
    ttyreel()
        .arg("--quiet")
        .arg("render")
        .arg(&recording)
        .arg("-o")
        .arg(&output)
        .args(["-q", "10", "-s", "2"])
        .assert()
        .success();
    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
}

#[test]
fn test_generate_writes_player() {
    let temp = TempDir::new().unwrap();
    let recording = write_recording(temp.path());
    ttyreel()
        .arg("generate")
        .arg(&recording)
        .assert()
        .success();
    let html = fs::read_to_string(temp.path().join("demo.html")).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("var delays = [10.0,50.0,20.0];"));
}
