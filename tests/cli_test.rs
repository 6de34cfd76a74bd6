// CLI smoke tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, contents) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, contents).unwrap();
    }
    dir
}

#[test]
fn analyze_writes_artifacts() {
    let dir = project(&[
        ("a.py", "import b\n\nb.run()\n"),
        ("b.py", "def run():\n    pass\n"),
    ]);
    let out = dir.path().join("out");

    Command::cargo_bin("repolens")
        .unwrap()
        .arg("analyze")
        .arg(dir.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyzed 2 files"));

    assert!(out.join("architecture.mmd").is_file());
    assert!(out.join("complexity.mmd").is_file());
    assert!(out.join("report.md").is_file());
}

#[test]
fn analyze_fails_on_syntax_error() {
    let dir = project(&[("bad.py", "def broken(:\n")]);
    let out = dir.path().join("out");

    Command::cargo_bin("repolens")
        .unwrap()
        .arg("analyze")
        .arg(dir.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Critical issues found"));
}

#[test]
fn analyze_missing_path_errors() {
    Command::cargo_bin("repolens")
        .unwrap()
        .arg("analyze")
        .arg("/definitely/not/a/repo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn json_format_writes_json_report() {
    let dir = project(&[("a.py", "x = 1\n")]);
    let out = dir.path().join("out");

    Command::cargo_bin("repolens")
        .unwrap()
        .arg("analyze")
        .arg(dir.path())
        .arg("--output")
        .arg(&out)
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let report = fs::read_to_string(out.join("report.json")).unwrap();
    assert!(report.contains("\"issues\""));
}

#[test]
fn version_prints() {
    Command::cargo_bin("repolens")
        .unwrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("repolens"));
}
