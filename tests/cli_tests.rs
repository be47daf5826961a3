//! Integration tests for the `algoscope` binary: output formats and exit codes.

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn algoscope() -> Command {
    let mut cmd = Command::cargo_bin("algoscope").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_source(dir: &TempDir, name: &str, source: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_analyze_prints_json_result() {
    let dir = TempDir::new().unwrap();
    let file = write_source(
        &dir,
        "sum.py",
        "def total(arr):\n    s = 0\n    for x in arr:\n        s += x\n    return s\n",
    );

    let output = algoscope()
        .current_dir(dir.path())
        .args(["analyze", "--lang", "python", "--file", &file])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(json["timeComplexity"], "O(n)");
    assert_eq!(json["spaceComplexity"], "O(1)");
    assert_eq!(json["patterns"][0], "Linear Scan");
    assert!(json["performance"]["score"].as_u64().unwrap() >= 90);
}

#[test]
fn test_empty_file_exits_with_empty_input_code() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "blank.js", "   \n");

    let output = algoscope()
        .current_dir(dir.path())
        .args(["analyze", "-l", "javascript", "-f", &file])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["error"]["kind"], "EmptyInput");
}

#[test]
fn test_unknown_language_is_a_usage_error() {
    algoscope()
        .args(["analyze", "--lang", "cobol", "--file", "x.cob"])
        .assert()
        .code(2);
}

#[test]
fn test_language_shorthand_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "a.js", "function f(a) { return a; }\n");

    let output = algoscope()
        .args(["analyze", "--lang", "js", "--file", &file])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_file_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = algoscope()
        .current_dir(dir.path())
        .args(["analyze", "--lang", "go", "--file", "nope.go"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.go"));
}

#[test]
fn test_output_file_and_yaml_format() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "f.rs", "fn one() -> i32 { 1 }\n");
    let out = dir.path().join("reports/one.yaml");

    algoscope()
        .current_dir(dir.path())
        .args(["analyze", "--lang", "rust", "--file", &file, "-F", "yaml"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let yaml = fs::read_to_string(out).unwrap();
    assert!(yaml.contains("timeComplexity: O(1)"));
}

#[test]
fn test_stdin_source() {
    algoscope()
        .args(["analyze", "--lang", "javascript", "--file", "-", "-F", "terminal"])
        .write_stdin("function f(a) { for (const x of a) { g(x); } }")
        .assert()
        .success();
}

#[test]
fn test_discovered_config_changes_scoring() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".algoscope.toml"),
        "[scoring]\nnested-loop = 50\nlinear-membership = 0\n",
    )
    .unwrap();
    let file = write_source(
        &dir,
        "pairs.py",
        "def f(a, b):\n    for i in a:\n        for j in b:\n            if a[i] == b[j]:\n                return True\n",
    );

    let output = algoscope()
        .current_dir(dir.path())
        .args(["analyze", "--lang", "python", "--file", &file])
        .output()
        .unwrap();

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["performance"]["score"], 50);
}

#[test]
fn test_invalid_explicit_config_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = write_source(&dir, "bad.toml", "[scoring]\nnested-loop = 500\n");
    let file = write_source(&dir, "a.py", "x = 1\n");

    algoscope()
        .args(["analyze", "--lang", "python", "--file", &file, "--config", &config])
        .assert()
        .code(2);
}

#[test]
fn test_init_writes_config_once() {
    let dir = TempDir::new().unwrap();

    algoscope().current_dir(dir.path()).arg("init").assert().success();
    let written = fs::read_to_string(dir.path().join(".algoscope.toml")).unwrap();
    assert!(written.contains("[scoring]"));

    algoscope().current_dir(dir.path()).arg("init").assert().code(2);
    algoscope()
        .current_dir(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}
