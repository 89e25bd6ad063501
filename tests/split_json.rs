use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;

fn transcript(paragraphs: usize) -> String {
    (1..=paragraphs)
        .map(|i| format!("User {i}: how do lifetimes work? Assistant {i}: they scope borrows."))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[test]
fn split_json_shape() {
    let mut cmd = Command::cargo_bin("ctt").unwrap();
    let text = transcript(12);
    cmd.args(["split", "--json", "--max-tokens", "40", "--text", text.as_str()]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let v: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let chunks = v["chunks"].as_array().unwrap();
    assert!(chunks.len() > 1);
    assert_eq!(chunks[0]["id"], 1);
    assert_eq!(chunks[0]["filename"], "chat-part-01.txt");
    for chunk in chunks {
        assert!(chunk["approxTokens"].as_u64().unwrap() <= 40);
    }
}

#[test]
fn split_file_writes_parts() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("chat.txt");
    std::fs::write(&input, transcript(20)).unwrap();
    let out = temp.path().join("parts");

    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.arg("split")
        .arg(&input)
        .args(["--max-tokens", "50", "--out"])
        .arg(&out);
    cmd.assert().success().stdout(contains("chat-part-01.txt"));

    let first = std::fs::read_to_string(out.join("chat-part-01.txt")).unwrap();
    assert!(first.starts_with("User 1:"));
    assert!(out.join("chat-part-02.txt").exists());
}

#[test]
fn split_json_with_out_dir_is_valid_json() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("parts");

    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args([
        "split",
        "--json",
        "--max-tokens",
        "5",
        "--text",
        "First one.\n\nSecond one here.",
        "--out",
    ])
    .arg(&out);
    let output = cmd.assert().success().get_output().stdout.clone();

    let v: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(v["chunks"].as_array().unwrap().len(), 2);
    assert!(out.join("chat-part-01.txt").exists());
    assert!(out.join("chat-part-02.txt").exists());
}

#[test]
fn split_inline_crlf_text_splits_on_blank_lines() {
    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args([
        "split",
        "--json",
        "--max-tokens",
        "5",
        "--text",
        "First one.\r\n\r\nSecond one here.",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let v: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let chunks = v["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0]["text"], "First one.");
    assert_eq!(chunks[1]["text"], "Second one here.");
}

#[test]
fn split_json_reports_missing_text() {
    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args(["split", "--json", "--text", ""]);
    let output = cmd
        .assert()
        .failure()
        .stderr(contains("Missing text input."))
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(v, serde_json::json!({ "error": "Missing text input." }));
}

#[test]
fn split_clamps_to_config_limit() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("ctt.json");
    std::fs::write(&config, r#"{ "models": { "tiny-model": 30 } }"#).unwrap();

    let mut cmd = Command::cargo_bin("ctt").unwrap();
    let text = transcript(6);
    cmd.arg("--config")
        .arg(&config)
        .args(["split", "-m", "tiny-model", "--max-tokens", "9999", "--text", text.as_str()]);
    cmd.assert()
        .success()
        .stdout(contains("for tiny-model (budget 30 tokens)"));
}

#[test]
fn summary_log_roundtrip() {
    let temp = tempfile::tempdir().unwrap();
    let db = temp.path().join("ctt.db");

    for i in 1..=6 {
        let text = format!("summary number {i}");
        let mut cmd = Command::cargo_bin("ctt").unwrap();
        cmd.args(["summary", "add", "--db"])
            .arg(&db)
            .args(["--tag", "rust", text.as_str()]);
        cmd.assert().success().stdout(contains("added summary_"));
    }

    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args(["summary", "compact", "--db"]).arg(&db);
    cmd.assert()
        .success()
        .stdout(contains("compacted 6 entries into 3"));

    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args(["summary", "list", "--db"]).arg(&db);
    cmd.assert().success().stdout(contains("[Tier 2]"));
}

#[test]
fn api_key_set_show_clear() {
    let temp = tempfile::tempdir().unwrap();
    let db = temp.path().join("ctt.db");

    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args(["key", "set", "--db"]).arg(&db).arg("sk-test-123");
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args(["key", "show", "--db"]).arg(&db);
    cmd.assert().success().stdout(contains("sk-test-123"));

    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args(["key", "clear", "--db"]).arg(&db);
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("ctt").unwrap();
    cmd.args(["key", "show", "--db"]).arg(&db);
    cmd.assert().success().stdout(contains("no API key stored"));
}
