//! CLI smoke tests — verify basic binary behavior.

use std::process::Command;

fn cli_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_gridiron"))
}

#[test]
fn test_help_flag() {
    let output = cli_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage"),
        "Expected usage info in --help output"
    );
    assert!(stdout.contains("--debug"));
    assert!(stdout.contains("--probe"));
}

#[test]
fn test_version_flag() {
    let output = cli_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("gridiron"),
        "Expected crate name in --version output"
    );
}

#[test]
fn test_missing_league_config_fails_cleanly() {
    // No league configured anywhere: validation fails before any network I/O
    let output = cli_bin()
        .env_remove("LEAGUE_ID")
        .env_remove("YEAR")
        .env("LLM_PROVIDER", "mock")
        .arg("--config")
        .arg("/tmp/nonexistent_gridiron_config_12345.toml")
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("league") || stderr.contains("LEAGUE_ID"),
        "Expected a league configuration error, got: {}",
        stderr
    );
}
