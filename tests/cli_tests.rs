//! CLI Integration Tests for authgate
//!
//! Runs the built `authgate-server` binary with `--help`, `--version` and
//! `check-config` against temporary config files.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

const SECRET: &str = "cli-test-secret-that-is-at-least-32-bytes";

/// Runs authgate-server inside `dir` with a clean, controlled environment
fn run_authgate(args: &[&str], dir: &TempDir, env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_authgate-server"));
    cmd.args(args).current_dir(dir.path());

    for var in [
        "JWT_SECRET",
        "AUTHGATE_CONFIG",
        "PORT",
        "TOKEN_TTL_MIN",
        "SHUTDOWN_TIMEOUT_SEC",
        "DB_DSN",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }

    cmd.output().expect("Failed to execute authgate-server")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    let output = run_authgate(&["--help"], &dir, &[]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("authgate"));
    assert!(out.contains("check-config"));
    assert!(out.contains("--config"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = run_authgate(&["--version"], &dir, &[]);

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_authgate(&["launch-rockets"], &dir, &[]);

    assert!(!output.status.success());
}

// =============================================================================
// check-config Tests
// =============================================================================

#[test]
fn test_check_config_with_defaults() {
    let dir = TempDir::new().unwrap();
    let output = run_authgate(&["check-config"], &dir, &[("JWT_SECRET", SECRET)]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("configuration OK"));
    assert!(out.contains("0.0.0.0:8080"));
    assert!(out.contains("60 min"));
}

#[test]
fn test_check_config_never_prints_secret() {
    let dir = TempDir::new().unwrap();
    let output = run_authgate(&["check-config", "--verbose"], &dir, &[("JWT_SECRET", SECRET)]);

    assert!(output.status.success());
    assert!(!stdout(&output).contains(SECRET));
    assert!(!stderr(&output).contains(SECRET));
}

#[test]
fn test_check_config_reads_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("custom.toml"),
        r#"
[server]
host = "127.0.0.1"
port = 9100

[auth]
jwt_secret_env = "CUSTOM_SECRET"
token_ttl_minutes = 15
"#,
    )
    .unwrap();

    let output = run_authgate(
        &["--config", "custom.toml", "check-config"],
        &dir,
        &[("CUSTOM_SECRET", SECRET)],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("127.0.0.1:9100"));
    assert!(out.contains("15 min"));
    assert!(out.contains("$CUSTOM_SECRET"));
}

#[test]
fn test_env_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("authgate.toml"), "[server]\nport = 9100\n").unwrap();

    let output = run_authgate(
        &["check-config"],
        &dir,
        &[("JWT_SECRET", SECRET), ("PORT", "9200"), ("TOKEN_TTL_MIN", "5")],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains(":9200"));
    assert!(out.contains("5 min"));
}

#[test]
fn test_invalid_env_override_is_ignored() {
    let dir = TempDir::new().unwrap();
    let output = run_authgate(
        &["check-config"],
        &dir,
        &[("JWT_SECRET", SECRET), ("PORT", "not-a-port"), ("TOKEN_TTL_MIN", "-3")],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains(":8080"));
    assert!(out.contains("60 min"));
}

#[test]
fn test_check_config_missing_secret_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_authgate(&["check-config"], &dir, &[]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("JWT_SECRET"));
}

#[test]
fn test_check_config_rejects_malformed_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("authgate.toml"), "[server\nport = ").unwrap();

    let output = run_authgate(&["check-config"], &dir, &[("JWT_SECRET", SECRET)]);

    assert!(!output.status.success());
}

#[test]
fn test_check_config_rejects_zero_ttl_in_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("authgate.toml"),
        "[auth]\ntoken_ttl_minutes = 0\n",
    )
    .unwrap();

    let output = run_authgate(&["check-config"], &dir, &[("JWT_SECRET", SECRET)]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("token_ttl_minutes"));
}

#[test]
fn test_check_config_rejects_unbounded_ttl() {
    let dir = TempDir::new().unwrap();
    let output = run_authgate(
        &["check-config"],
        &dir,
        &[("JWT_SECRET", SECRET), ("TOKEN_TTL_MIN", "200000000000")],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("token_ttl_minutes"));
}
