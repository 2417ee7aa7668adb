use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

mod stubs;

use stubs::config::{outbox_messages, write_config, Dirs};
use stubs::snapshots::{write_snapshot, LEGACY_BURSTS, TEN_DEVICES};

fn cmd(root: &Path, dirs: &Dirs) -> Command {
    let mut cmd = Command::cargo_bin("batt-report").unwrap();
    cmd.current_dir(root)
        .env("BATT_CONFIG_DIR", &dirs.config)
        .env("BATT_REPORT_DIR", &dirs.reports)
        .env("LOG_LEVEL", "info");
    cmd
}

#[test]
fn cached_date_skips_database() {
    let tempdir = tempfile::tempdir().unwrap();
    let dirs = write_config(tempdir.path());
    write_snapshot(&dirs.reports, "latest_batt_2025-01-15.csv", TEN_DEVICES);

    // The configured font does not exist, so the run stops at the chart, after loading
    cmd(tempdir.path(), &dirs)
        .args(["daily", "--date", "2025-01-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Loading existing report for 2025-01-15"))
        .stderr(predicate::str::contains("Generating new report").not())
        .stderr(predicate::str::contains("Failed to render chart"))
        .stderr(predicate::str::contains("cannot read chart font"));

    assert!(outbox_messages(&dirs.outbox).is_empty());
}

#[test]
fn legacy_bursts_snapshot_keeps_new_pv_devices() {
    let tempdir = tempfile::tempdir().unwrap();
    let dirs = write_config(tempdir.path());
    write_snapshot(&dirs.reports, "latest_batt_old_2025-01-14.csv", LEGACY_BURSTS);

    cmd(tempdir.path(), &dirs)
        .args(["daily", "--old", "--date", "2025-01-14"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Loading existing report for 2025-01-14"))
        .stderr(predicate::str::contains(
            "2 of 2 devices are in the NewPV & 6000+ Series list",
        ));
}

#[test]
fn uncached_date_queries_database() {
    let tempdir = tempfile::tempdir().unwrap();
    let dirs = write_config(tempdir.path());

    cmd(tempdir.path(), &dirs)
        .args(["daily", "--old", "--date", "2025-01-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Generating new report for 2025-01-15 using DebugSMBs database",
        ));

    // Nothing is cached after a failed query
    assert!(!dirs.reports.join("latest_batt_old_2025-01-15.csv").exists());
}

#[test]
fn future_date_is_rejected() {
    let tempdir = tempfile::tempdir().unwrap();
    let dirs = write_config(tempdir.path());

    cmd(tempdir.path(), &dirs)
        .args(["daily", "--date", "2999-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("after today"))
        .stderr(predicate::str::contains("Generating new report").not());
}

#[test]
fn manual_prompt_needs_input() {
    let tempdir = tempfile::tempdir().unwrap();
    let dirs = write_config(tempdir.path());

    cmd(tempdir.path(), &dirs)
        .args(["daily", "--manual"])
        .write_stdin("")
        .assert()
        .failure()
        .stdout(predicate::str::contains("YYYY-MM-DD"));
}
