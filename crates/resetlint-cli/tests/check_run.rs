// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Integration tests for `resetlint check`.
//! Each test runs the binary against a .go fixture and checks the exit
//! code and output.

use std::path::{Path, PathBuf};
use std::process::Command;

fn resetlint_binary() -> PathBuf {
    // cargo test builds into target/debug or target/release
    let mut path = std::env::current_exe().unwrap();
    // Walk up from the test binary to the target dir
    path.pop(); // remove test binary name
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("resetlint");
    path
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run_check(args: &[&str]) -> (String, String, i32) {
    let out = Command::new(resetlint_binary())
        .arg("check")
        .args(args)
        .output()
        .expect("failed to run resetlint");
    (
        String::from_utf8_lossy(&out.stdout).into_owned(),
        String::from_utf8_lossy(&out.stderr).into_owned(),
        out.status.code().unwrap_or(-1),
    )
}

#[test]
fn clean_file_passes() {
    let path = fixture("clean.go");
    let (stdout, _, code) = run_check(&[path.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("OK"), "stdout: {}", stdout);
}

#[test]
fn missing_field_fails_with_diagnostic() {
    let path = fixture("missing.go");
    let (_, stderr, code) = run_check(&[path.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("`name`"), "stderr: {}", stderr);
    assert!(stderr.contains("reset/uncovered-field"), "stderr: {}", stderr);
}

#[test]
fn json_output_is_machine_readable() {
    let path = fixture("missing.go");
    let (stdout, _, code) = run_check(&["--json", path.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stdout.contains("\"rule\": \"reset/uncovered-field\""));
    assert!(stdout.contains("\"success\": false"));
}

#[test]
fn multiple_files_fail_if_any_fails() {
    let clean = fixture("clean.go");
    let missing = fixture("missing.go");
    let (_, _, code) = run_check(&[clean.to_str().unwrap(), missing.to_str().unwrap()]);
    assert_eq!(code, 1);
}
