//! End-to-end checks of the `lgt` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn write_sample(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_boundaries_mode_reports_entity() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(
        &dir,
        "obj.lgt",
        ":- object(sample).\n\np.\n\n:- end_object.\n",
    );

    Command::cargo_bin("lgt")
        .unwrap()
        .arg(&path)
        .args(["--mode", "boundaries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EntityOpen"))
        .stdout(predicate::str::contains("EntityClose"));
}

#[test]
fn test_tokens_mode_tiles_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir, "p.lgt", "p(X).\n");

    Command::cargo_bin("lgt")
        .unwrap()
        .arg(&path)
        .args(["--mode", "tokens"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Atom\""))
        .stdout(predicate::str::contains("\"Period\""));
}

#[test]
fn test_indent_mode_proposes_a_tab() {
    let dir = tempfile::tempdir().unwrap();
    let content = "rule(X) :-\n";
    let path = write_sample(&dir, "rule.lgt", content);

    Command::cargo_bin("lgt")
        .unwrap()
        .arg(&path)
        .args(["--mode", "indent", "--offset", &content.len().to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"indent\": \"\\t\""))
        .stdout(predicate::str::contains("EnterBody"));
}

#[test]
fn test_anomalies_mode_reports_unterminated_quote() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir, "bad.lgt", "p :- 'oops\n");

    Command::cargo_bin("lgt")
        .unwrap()
        .arg(&path)
        .args(["--mode", "anomalies"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unterminated literal"));
}

#[test]
fn test_clause_mode_reports_the_clause_under_the_offset() {
    let dir = tempfile::tempdir().unwrap();
    let content = "fact(1).\nrule(X) :- goal(X).\n";
    let path = write_sample(&dir, "clauses.lgt", content);
    let offset = content.find("goal").unwrap();

    Command::cargo_bin("lgt")
        .unwrap()
        .arg(&path)
        .args(["--mode", "clause", "--offset", &offset.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("rule(X) :- goal(X)."))
        .stdout(predicate::str::contains("\"directive\": false"));
}

#[test]
fn test_indent_requires_offset() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(&dir, "p.lgt", "p.\n");

    Command::cargo_bin("lgt")
        .unwrap()
        .arg(&path)
        .args(["--mode", "indent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires --offset"));
}

#[test]
fn test_missing_file_fails() {
    Command::cargo_bin("lgt")
        .unwrap()
        .arg("does-not-exist.lgt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read"));
}
