//! Startup validation tests, with no database or network I/O.
//!
//! Every failing case here must be rejected while configuration is being
//! assembled, before the binary tries to reach MySQL or the provider.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pixyproxy");
    for key in ["PIXY_CONFIG", "DB_PORT", "DB_POOL_SIZE", "RUST_LOG"] {
        cmd.env_remove(key);
    }
    cmd
}

/// Write `contents` to a fresh config file under the temp dir.
fn config_file(name: &str, contents: &str) -> PathBuf {
    let dir =
        std::env::temp_dir().join(format!("pixyproxy_cli_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("pixyproxy.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn help_lists_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--images-dir"));
}

#[test]
fn unknown_flag_exits_with_error() {
    cmd().arg("--prompt").assert().failure();
}

#[test]
fn invalid_toml_exits_with_error() {
    let path = config_file("bad_toml", "this is not valid toml {{{");

    cmd()
        .args(["--config", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));
}

#[test]
fn unsupported_style_exits_with_error() {
    let path = config_file("bad_style", "[provider]\nstyle = \"pastel\"\n");

    cmd()
        .args(["--config", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported style"));
}

#[test]
fn config_path_from_environment() {
    let path = config_file("env_path", "[provider]\nsize = \"4K\"\n");

    cmd()
        .env("PIXY_CONFIG", path.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported size"));
}

#[test]
fn bad_port_env_exits_with_error() {
    cmd()
        .env("DB_PORT", "not-a-port")
        .args(["--config", "/nonexistent/pixyproxy.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DB_PORT"));
}

#[test]
fn zero_pool_size_exits_with_error() {
    cmd()
        .env("DB_POOL_SIZE", "0")
        .args(["--config", "/nonexistent/pixyproxy.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pool_size"));
}
