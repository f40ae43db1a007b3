//! Drives the built `aide` binary as a subprocess.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Runs with the config file's directory as the working directory, so
/// `.aide/sessions` lands next to it.
fn aide(config: &Path, args: &[&str], stdin: &str) -> Output {
    let workdir = config.parent().expect("config has a parent dir");
    let mut child = Command::new(env!("CARGO_BIN_EXE_aide"))
        .current_dir(workdir)
        .arg("--config")
        .arg(config)
        .arg("--no-color")
        .args(args)
        .env_remove("AIDE_PROVIDER")
        .env_remove("AIDE_MODEL")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn aide");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for aide")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn config_set_then_get_prints_value() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("aide.toml");

    let set = aide(&config, &["config", "set", "foo.bar", "baz"], "");
    assert!(set.status.success(), "stderr: {}", String::from_utf8_lossy(&set.stderr));

    let get = aide(&config, &["config", "get", "foo.bar"], "");
    assert!(get.status.success());
    assert_eq!(stdout(&get), "baz\n");
}

#[test]
fn config_get_without_key_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("aide.toml");
    aide(&config, &["config", "set", "model", "claude-3"], "");

    let get = aide(&config, &["config", "get"], "");
    let value: serde_json::Value = serde_json::from_str(&stdout(&get)).unwrap();
    assert_eq!(value, serde_json::json!({ "model": "claude-3" }));
}

#[test]
fn config_repairs_out_of_range_temperature() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("aide.toml");
    std::fs::write(&config, "[ai]\ntemperature = 9.0\n").unwrap();

    let get = aide(&config, &["config", "get"], "");
    assert!(get.status.success(), "stderr: {}", stderr(&get));

    let set = aide(&config, &["config", "set", "temperature", "0.5"], "");
    assert!(set.status.success(), "stderr: {}", stderr(&set));

    let get = aide(&config, &["config", "get", "temperature"], "");
    assert_eq!(stdout(&get), "0.5\n");

    let chat = aide(&config, &["chat"], "hi\n");
    assert!(chat.status.success(), "stderr: {}", stderr(&chat));
}

#[test]
fn out_of_range_temperature_fails_operations() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("aide.toml");
    std::fs::write(&config, "[ai]\ntemperature = 9.0\n").unwrap();

    let out = aide(&config, &["analyze", "src"], "");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("error: [AI_ANALYZE_FAILED]"), "stderr: {}", stderr(&out));
}

#[test]
fn config_values_print_as_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("aide.toml");
    for value in ["1.0", "007", "1e3", "+5"] {
        let set = aide(&config, &["config", "set", "version", value], "");
        assert!(set.status.success(), "stderr: {}", stderr(&set));
        let get = aide(&config, &["config", "get", "version"], "");
        assert_eq!(stdout(&get), format!("{value}\n"));
    }
}

#[test]
fn sessions_lists_saved_chat() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("aide.toml");
    let chat = aide(&config, &["chat", "--session", "work"], "hello\nexit\n");
    assert!(chat.status.success(), "stderr: {}", stderr(&chat));
    assert!(dir.path().join(".aide/sessions/work.json").exists());

    let list = aide(&config, &["sessions"], "");
    assert!(list.status.success());
    let listed = stderr(&list);
    assert!(listed.contains("sessions"), "stderr: {listed}");
    assert!(listed.contains("work: claude-3, 2 messages"), "stderr: {listed}");
}

#[test]
fn missing_config_key_exits_with_code() {
    let dir = tempfile::tempdir().unwrap();
    let get = aide(&dir.path().join("aide.toml"), &["config", "get", "absent"], "");
    assert_eq!(get.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&get.stderr);
    assert!(stderr.contains("error: [AI_CONFIG_GET_FAILED]"), "stderr: {stderr}");
}

#[test]
fn chat_answers_then_exits() {
    let dir = tempfile::tempdir().unwrap();
    let chat = aide(
        &dir.path().join("aide.toml"),
        &["chat", "--model", "claude-3"],
        "hello\n\nEXIT\n",
    );
    assert!(chat.status.success());
    assert_eq!(stdout(&chat), "ai> [claude-3] Mock response to: hello\n");
    let stderr = String::from_utf8_lossy(&chat.stderr);
    assert!(stderr.contains("message cannot be empty"));
}

#[test]
fn unknown_subcommand_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = aide(&dir.path().join("aide.toml"), &["summon"], "");
    assert!(!out.status.success());
}
