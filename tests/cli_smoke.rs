use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;

#[test]
fn prints_help() {
    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("split long transcripts"));
}

#[test]
fn estimate_inline_text() {
    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args(["estimate", "--text", "Tokens are not words."]);
    cmd.assert()
        .success()
        .stdout(contains("Words: 4"))
        .stdout(contains("Estimated tokens: 6"));
}

#[test]
fn estimate_requires_text() {
    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args(["estimate", "--text", "   "]);
    cmd.assert().failure().stderr(contains("Missing text input."));
}

#[test]
fn split_missing_text_fails() {
    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args(["split", "--text", ""]);
    cmd.assert().failure().stderr(contains("Missing text input."));
}

#[test]
fn models_lists_default() {
    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.arg("models");
    cmd.assert()
        .success()
        .stdout(contains("gpt-4.1-mini"))
        .stdout(contains("128000"))
        .stdout(contains("32000"));
}

#[test]
fn rejects_docx_input() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("notes.docx");
    std::fs::write(&path, "PK binary-ish").unwrap();

    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.arg("split").arg(&path);
    cmd.assert().failure().stderr(contains("Unsupported file type"));
}
