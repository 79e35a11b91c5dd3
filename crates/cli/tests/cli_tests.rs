//! Integration tests for the `gridsynth` CLI binary.
//!
//! These exercise argument parsing and the error paths a missing input
//! file or an unconfigured synthesizer produce; the pipeline's own
//! algorithms are covered by `crates/core`'s unit tests.

#[allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[allow(deprecated)]
fn gridsynth() -> Command {
    Command::cargo_bin("gridsynth").expect("binary should exist")
}

#[test]
fn no_args_shows_usage() {
    gridsynth().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag_lists_options() {
    gridsynth()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--top"))
        .stdout(predicate::str::contains("--compact"))
        .stdout(predicate::str::contains("--no-flatten"));
}

#[test]
fn missing_top_flag_fails() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("design.v");
    std::fs::write(&input, "module top(input a); endmodule\n").unwrap();

    gridsynth()
        .args([input.to_str().unwrap(), tmp.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--top"));
}

#[test]
fn missing_input_file_fails() {
    let tmp = TempDir::new().unwrap();
    gridsynth()
        .args(["does_not_exist.v", tmp.path().to_str().unwrap(), "--top", "top"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn unknown_top_module_fails() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("design.v");
    std::fs::write(&input, "module leaf(input a); endmodule\n").unwrap();

    gridsynth()
        .args([input.to_str().unwrap(), tmp.path().to_str().unwrap(), "--top", "top"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("top"));
}

#[test]
fn unconfigured_synthesizer_fails() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("design.v");
    std::fs::write(&input, "module top(input a); endmodule\n").unwrap();

    gridsynth()
        .env_remove("GRIDSYNTH_SYNTH")
        .args([input.to_str().unwrap(), tmp.path().to_str().unwrap(), "--top", "top"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GRIDSYNTH_SYNTH"));
}
