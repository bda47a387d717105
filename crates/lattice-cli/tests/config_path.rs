use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("[live]"));
    assert!(contents.contains("tick_ms = 50"));
    assert!(contents.contains("# filter ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_generate_prints_defaults() {
    cargo_bin_cmd!("lattice")
        .args(["config", "generate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("threshold = 0.2"))
        .stdout(predicate::str::contains("stagger_ms = 200"));
}

#[test]
fn test_broken_config_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "[reveal]\nroot_margin = \"wide\"\n").unwrap();

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", dir.path())
        .args(["simulate", "--duration-ms", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("load config"));
}

#[test]
fn test_live_config_that_shrinks_totals_is_rejected() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[live]\ncompressed_tx_bytes = 600.0\n",
    )
    .unwrap();

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", dir.path())
        .args(["live", "--seconds", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid [live] section"))
        .stderr(predicate::str::contains("exceeds uncompressed_tx_bytes"));
}
