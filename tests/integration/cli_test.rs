use std::path::Path;
use std::process::{Command, Output};
use anyhow::Result;

fn kura(dir: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new(env!("CARGO_BIN_EXE_kura"))
        .arg("--dir")
        .arg(dir)
        .args(args)
        .output()?;
    Ok(output)
}

fn stdout(output: &Output) -> Result<String> {
    Ok(String::from_utf8(output.stdout.clone())?.trim().to_string())
}

/// Test that the CLI reports the database layout
#[test]
fn test_cli_info_command() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let dir = temp_dir.path().join("db");

    let output = kura(&dir, &["--block-size", "512", "--buffers", "4", "info"])?;
    assert!(output.status.success(), "CLI info command failed");

    let text = stdout(&output)?;
    assert!(text.contains("Block size:        512"), "unexpected info output: {}", text);
    assert!(text.contains("Available buffers: 4"), "unexpected info output: {}", text);
    assert!(dir.join("kura.log").exists());
    Ok(())
}

/// Values written by one invocation are read back by the next
#[test]
fn test_cli_set_then_get() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let dir = temp_dir.path().join("db");

    assert!(kura(&dir, &["append", "t.tbl"])?.status.success());
    assert_eq!(stdout(&kura(&dir, &["size", "t.tbl"])?)?, "1");

    assert!(kura(&dir, &["set-int", "t.tbl", "0", "80", "-42"])?.status.success());
    assert!(kura(&dir, &["set-string", "t.tbl", "0", "8", "hello"])?.status.success());

    assert_eq!(stdout(&kura(&dir, &["get-int", "t.tbl", "0", "80"])?)?, "-42");
    assert_eq!(stdout(&kura(&dir, &["get-string", "t.tbl", "0", "8"])?)?, "hello");
    Ok(())
}

/// The log dump shows typed records newest first
#[test]
fn test_cli_log_dump() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let dir = temp_dir.path().join("db");

    assert!(kura(&dir, &["set-int", "t.tbl", "0", "80", "7"])?.status.success());

    let output = kura(&dir, &["log"])?;
    assert!(output.status.success());
    let text = stdout(&output)?;
    let lines: Vec<&str> = text.lines().collect();
    // Opening an existing database runs a recovery transaction first
    assert_eq!(lines[0], "<COMMIT 1>");
    assert_eq!(lines[1], "<CHECKPOINT>");
    assert!(text.contains("<SETINT 1 [file t.tbl, block 0] 80 0>"), "missing update record: {}", text);

    let raw = kura(&dir, &["log", "--raw"])?;
    assert!(raw.status.success());
    let raw_text = stdout(&raw)?;
    assert!(raw_text.lines().all(|line| line.chars().all(|c| c.is_ascii_hexdigit())));
    Ok(())
}

/// Reading outside the block is reported as an error
#[test]
fn test_cli_rejects_out_of_range_offset() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let dir = temp_dir.path().join("db");

    let output = kura(&dir, &["get-int", "t.tbl", "0", "398"])?;
    assert!(!output.status.success());
    Ok(())
}
