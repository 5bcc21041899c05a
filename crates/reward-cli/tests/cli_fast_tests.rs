//! Fast CLI tests using assert_cmd.
//! These test the binary directly without needing a Docker daemon.

#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but works fine

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

#[test]
fn test_help_flag() {
    Command::cargo_bin("reward")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local development environment orchestrator"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("reward")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_subcommand_help() {
    for subcmd in [
        vec!["network", "--help"],
        vec!["network", "connect", "--help"],
        vec!["network", "exists", "--help"],
        vec!["container", "find", "--help"],
        vec!["install", "--help"],
        vec!["unzip", "--help"],
    ] {
        Command::cargo_bin("reward")
            .unwrap()
            .args(&subcmd)
            .assert()
            .success()
            .stdout(predicate::str::is_empty().not());
    }
}

#[test]
fn test_unknown_subcommand_fails() {
    Command::cargo_bin("reward")
        .unwrap()
        .arg("nonexistent-subcommand")
        .assert()
        .failure();
}

#[test]
fn test_unknown_network_action_fails() {
    Command::cargo_bin("reward")
        .unwrap()
        .args(["network", "pause", "shop_default"])
        .assert()
        .failure();
}

#[test]
fn test_install_rejects_plain_http() {
    let tmp = tempfile::tempdir().unwrap();
    Command::cargo_bin("reward")
        .unwrap()
        .args(["install", "http://example.com/tool.tar.gz", "tool", "--dest"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTPS"));
}

#[test]
fn test_unzip_extracts_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let archive = tmp.path().join("tools.zip");

    let mut writer = zip::ZipWriter::new(std::fs::File::create(&archive).unwrap());
    writer
        .start_file("bin/tool", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"#!/bin/sh\n").unwrap();
    writer.finish().unwrap();

    let dest = tmp.path().join("out");
    Command::cargo_bin("reward")
        .unwrap()
        .arg("unzip")
        .arg(&archive)
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 1 entries"));

    assert_eq!(std::fs::read(dest.join("bin/tool")).unwrap(), b"#!/bin/sh\n");
}

#[test]
fn test_unzip_missing_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    Command::cargo_bin("reward")
        .unwrap()
        .arg("unzip")
        .arg(tmp.path().join("missing.zip"))
        .arg(tmp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot open"));
}

#[test]
fn test_invalid_config_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config.toml");
    std::fs::write(&config, "[peering\n").unwrap();

    Command::cargo_bin("reward")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .args(["network", "exists", "shop_default"])
        .assert()
        .failure();
}

#[cfg(target_os = "linux")]
#[test]
fn test_malformed_default_config_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let config_dir = tmp.path().join("reward");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "[peering\n").unwrap();

    Command::cargo_bin("reward")
        .unwrap()
        .env("XDG_CONFIG_HOME", tmp.path())
        .env_remove("REWARD_LOG")
        .arg("unzip")
        .arg(tmp.path().join("missing.zip"))
        .arg(tmp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Ignoring unusable config"));
}
