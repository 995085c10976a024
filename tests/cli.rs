use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const TABLE: &str = r#"
[[drivers]]
id = "X11"
name = "X11 window"
modes = [
    { width = 800, height = 600, bpp = 16 },
    { width = 800, height = 600, bpp = 32 },
    { width = 1024, height = 768, bpp = 32 },
]

[[drivers]]
id = "VGA"
name = "Standard VGA"
"#;

fn table() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drivers.toml");
    fs::write(&path, TABLE).unwrap();
    let path = path.to_string_lossy().to_string();
    (dir, path)
}

fn modesel() -> Command {
    Command::cargo_bin("gfx-modesel").unwrap()
}

#[test]
fn test_list_prints_catalog() {
    let (_dir, path) = table();
    modesel()
        .args(["--platform-file", &path, "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Autodetect windowed"))
        .stdout(predicate::str::contains("X11 window"))
        .stdout(predicate::str::contains("1024"));
}

#[test]
fn test_scripted_ok_exits_zero() {
    let (_dir, path) = table();
    modesel()
        .args(["--platform-file", &path, "--keys", "down,down,down,enter"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"accepted\": true"))
        .stdout(predicate::str::contains("\"driver\": \"X11\""))
        .stdout(predicate::str::contains("\"width\": 800"));
}

#[test]
fn test_escape_exits_one_and_still_reports_mode() {
    let (_dir, path) = table();
    modesel()
        .args(["--platform-file", &path, "--keys", "esc"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"accepted\": false"))
        .stdout(predicate::str::contains("\"width\": 640"));
}

#[test]
fn test_extended_keeps_requested_depth() {
    let (_dir, path) = table();
    modesel()
        .args([
            "--platform-file",
            &path,
            "--extended",
            "--driver",
            "X11",
            "--width",
            "800",
            "--height",
            "600",
            "--depth",
            "32",
            "--keys",
            "enter",
        ])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"depth\": 32"));
}

#[test]
fn test_bad_script_exits_two() {
    let (_dir, path) = table();
    modesel()
        .args(["--platform-file", &path, "--keys", "sideways"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown input event"));
}

#[test]
fn test_missing_platform_file_exits_two() {
    modesel()
        .args(["--platform-file", "/nonexistent/drivers.toml", "--keys", "enter"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_config_exits_two() {
    let (dir, path) = table();
    let config = dir.path().join("modesel.toml");
    fs::write(&config, "[labels]\nok = \"\"\n").unwrap();
    modesel()
        .args(["--platform-file", &path, "--config"])
        .arg(&config)
        .args(["--keys", "enter"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Label 'ok' cannot be empty"));
}
