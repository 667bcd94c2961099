// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use std::io::Write as _;

fn write_snapshot(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn valid_snapshot_exits_zero_with_json_on_stdout() {
    let file = write_snapshot(&base_snapshot().finish());
    let output = Command::cargo_bin("snapdump")
        .unwrap()
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["version"], 1);
}

#[test]
fn missing_section_fails_with_its_name_and_no_tables_key() {
    // No block_state section at all.
    let bytes = SnapshotBuilder::new()
        .section(snapdump::dump::SECTION_HEADER)
        .row(&1u32)
        .section(snapdump::dump::SECTION_GENESIS)
        .row(&test_genesis())
        .build();
    let file = write_snapshot(&bytes);
    let output = Command::cargo_bin("snapdump")
        .unwrap()
        .arg(file.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("eosio::chain::block_state"));
    // The partial document is left as-is, but never reaches the tables key.
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("\"tables\""));
}

#[test]
fn nonexistent_path_fails() {
    Command::cargo_bin("snapdump")
        .unwrap()
        .arg("/no/such/snapshot.bin")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn directory_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("snapdump")
        .unwrap()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a regular file"));
}

#[test]
fn refuses_to_run_without_a_path() {
    Command::cargo_bin("snapdump").unwrap().assert().failure();
}
