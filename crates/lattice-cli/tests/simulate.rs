use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_simulate_jump_to_bottom() {
    let dir = tempdir().unwrap();

    // One step at 100ms lands on the bottom of the page; the live feed then
    // ticks every 50ms from 150ms to 2100ms.
    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", dir.path())
        .args([
            "simulate",
            "--duration-ms",
            "2100",
            "--scroll-step",
            "5000",
            "--step-ms",
            "100",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("counter \"Calldata reduction\": 75%"))
        .stdout(predicate::str::contains("live: running, 40 ticks"))
        .stdout(predicate::str::contains("txCompressed: 20,000"))
        .stdout(predicate::str::contains("bytesSaved: 7,500,000"))
        .stdout(predicate::str::contains("storageReclaimed: 7.50 MB"));
}

#[test]
fn test_simulate_full_scroll_finishes_counters() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", dir.path())
        .args(["simulate", "--duration-ms", "6000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(": 75%"))
        .stdout(predicate::str::contains(": 125\n"))
        .stdout(predicate::str::contains(": 0.18 ms"))
        .stdout(predicate::str::contains(": 99.9%"))
        .stdout(predicate::str::contains("bars: 100%, 62.5%, 25%"))
        .stdout(predicate::str::contains("hidden").not());
}

#[test]
fn test_simulate_trace_prints_effects() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", dir.path())
        .args(["simulate", "--duration-ms", "100", "--trace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0ms  add-class #1 visible"))
        .stdout(predicate::str::contains("request-frame"));
}

#[test]
fn test_simulate_custom_page() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("page.toml");
    fs::write(
        &page,
        r#"
title = "Tiny"

[[block]]
kind = "counter"
height = 100
label = "Broken"
target = "soon"

[[block]]
kind = "live"
height = 300
slots = ["bytesSaved"]
"#,
    )
    .unwrap();

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", dir.path())
        .args(["simulate", "--duration-ms", "500", "--page"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("counter \"Broken\": (not triggered)"))
        .stdout(predicate::str::contains("live: inert, 0 ticks"));
}

#[test]
fn test_simulate_missing_page_fails() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("lattice")
        .env("LATTICE_HOME", dir.path())
        .args(["simulate", "--page"])
        .arg(dir.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read page"));
}
