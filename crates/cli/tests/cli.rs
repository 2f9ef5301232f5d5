//! CLI tests that need no S3 endpoint
//!
//! Each test points the binary at its own config directory.

use std::path::Path;
use std::process::{Command, Output};

fn run_s3nav(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_s3nav"))
        .args(args)
        .env("S3NAV_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute s3nav")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn test_bucket_set_list_remove() {
    let config_dir = tempfile::tempdir().unwrap();
    let dir = config_dir.path();

    let output = run_s3nav(
        &[
            "bucket",
            "set",
            "media",
            "media-prod",
            "--endpoint",
            "http://localhost:9000",
            "--access-key",
            "accesskey",
            "--secret-key",
            "secretkey",
            "--root-folder",
            "team/docs",
        ],
        dir,
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let output = run_s3nav(&["bucket", "list", "--json"], dir);
    assert!(output.status.success());
    let json = stdout_json(&output);
    let buckets = json["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0]["name"], "media");
    assert_eq!(buckets[0]["bucket"], "media-prod");
    assert_eq!(buckets[0]["root_prefix"], "team/docs/");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("secretkey"));

    let content = std::fs::read_to_string(dir.join("config.toml")).unwrap();
    assert!(content.contains("media-prod"));

    let output = run_s3nav(&["bucket", "remove", "media"], dir);
    assert!(output.status.success());

    let output = run_s3nav(&["bucket", "list", "--json"], dir);
    let json = stdout_json(&output);
    assert!(json["buckets"].as_array().unwrap().is_empty());
}

#[test]
fn test_bucket_remove_missing() {
    let config_dir = tempfile::tempdir().unwrap();
    let output = run_s3nav(&["bucket", "remove", "nope"], config_dir.path());
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_bucket_set_rejects_bad_endpoint() {
    let config_dir = tempfile::tempdir().unwrap();
    let output = run_s3nav(
        &["bucket", "set", "media", "media-prod", "--endpoint", "not a url"],
        config_dir.path(),
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(!config_dir.path().join("config.toml").exists());
}

#[test]
fn test_ls_unknown_bucket() {
    let config_dir = tempfile::tempdir().unwrap();
    let output = run_s3nav(&["ls", "nope"], config_dir.path());
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope"));
}

#[test]
fn test_export_requires_selection() {
    let config_dir = tempfile::tempdir().unwrap();
    let output = run_s3nav(&["export", "media"], config_dir.path());
    assert_eq!(output.status.code(), Some(2));

    let output = run_s3nav(
        &["export", "media", "--all", "--select", "a.txt"],
        config_dir.path(),
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_completions() {
    let config_dir = tempfile::tempdir().unwrap();
    let output = run_s3nav(&["completions", "bash"], config_dir.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("s3nav"));
}
