//! CLI error paths and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn seriesfit() -> Command {
    Command::cargo_bin("seriesfit").unwrap()
}

#[test]
fn missing_input_file_is_a_runtime_error() {
    seriesfit()
        .args([
            "fit",
            "--kind",
            "regression",
            "--input",
            "/nonexistent/table.csv",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("I/O Error"));
}

#[test]
fn length_one_table_is_a_validation_error() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "1.0").unwrap();
    writeln!(tmp, "2.0").unwrap();

    seriesfit()
        .args(["fit", "--kind", "regression", "--no-color"])
        .arg("--input")
        .arg(tmp.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Series Too Short"));
}

#[test]
fn dimension_mismatch_is_a_validation_error() {
    // Three rows cannot feed the two-variable regression model.
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    for _ in 0..3 {
        writeln!(tmp, "1.0,2.0,3.0,4.0").unwrap();
    }

    seriesfit()
        .args(["fit", "--kind", "regression", "--no-color"])
        .arg("--input")
        .arg(tmp.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Dimension Mismatch"));
}

#[test]
fn malformed_table_reports_the_line() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "1.0,2.0").unwrap();
    writeln!(tmp, "3.0,oops").unwrap();

    seriesfit()
        .args(["fit", "--kind", "regression", "--no-color"])
        .arg("--input")
        .arg(tmp.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn constrained_fit_requires_a_mask() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "1.0,2.0,3.0").unwrap();
    writeln!(tmp, "2.0,1.0,2.0").unwrap();

    seriesfit()
        .args(["fit", "--kind", "var-constrained", "--no-color"])
        .arg("--input")
        .arg(tmp.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--mask"));
}

#[test]
fn check_rejects_invalid_priors_file() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        tmp,
        r#"{{"schema_version":"1","regression":{{"slope":{{"dist":"normal","mean":0.0,"sd":-1.0}},"intercept":{{"dist":"normal","mean":0.0,"sd":1.0}},"noise_sd":{{"dist":"half_normal","sd":1.0}}}}}}"#
    )
    .unwrap();

    seriesfit()
        .args(["check", "--no-color"])
        .arg("--priors")
        .arg(tmp.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid Model Specification"));
}

#[test]
fn simulate_rejects_bad_noise_scale() {
    seriesfit()
        .args([
            "simulate",
            "--kind",
            "regression",
            "--noise-sd",
            "0",
            "--no-color",
        ])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn unknown_preset_is_reported() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "1.0,2.0").unwrap();
    writeln!(tmp, "2.0,1.0").unwrap();

    seriesfit()
        .args([
            "fit",
            "--kind",
            "regression",
            "--preset",
            "bogus",
            "--no-color",
        ])
        .arg("--input")
        .arg(tmp.path())
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unknown preset"));
}
