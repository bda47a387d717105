use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_live_zero_seconds_prints_final_readout() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", home.path())
        .args(["live", "--seconds", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("final after 0 ticks:"))
        .stdout(predicate::str::contains("txCompressed: 0"))
        .stdout(predicate::str::contains("storageReclaimed: 0 B"));
}

#[test]
fn test_live_streams_per_second_lines() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", home.path())
        .args(["live", "--seconds", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[    20] bytes saved"))
        .stdout(predicate::str::contains("final after"));
}
