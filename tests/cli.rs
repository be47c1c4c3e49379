use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;

#[test]
fn cli_version() {
    Command::cargo_bin("pool-server")
        .unwrap()
        .arg("-V")
        .assert()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_zero_threads() {
    Command::cargo_bin("pool-server")
        .unwrap()
        .args(["--threads", "0", "--addr", "127.0.0.1:0"])
        .assert()
        .failure()
        .stderr(contains("at least one worker thread"));
}

#[test]
fn cli_invalid_addr() {
    Command::cargo_bin("pool-server")
        .unwrap()
        .args(["--addr", "not-an-addr"])
        .assert()
        .failure();
}

#[test]
fn cli_missing_root() {
    Command::cargo_bin("pool-server")
        .unwrap()
        .args(["--threads", "1", "--root", "/definitely/not/here", "--addr", "127.0.0.1:0"])
        .assert()
        .failure();
}
