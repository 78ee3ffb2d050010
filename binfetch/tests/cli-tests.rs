use std::process::{Command, Output, Stdio};

use camino::Utf8PathBuf;

static BIN: &str = env!("CARGO_BIN_EXE_binfetch");

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> &str {
    std::str::from_utf8(&output.stdout).unwrap()
}

fn stderr(output: &Output) -> &str {
    std::str::from_utf8(&output.stderr).unwrap()
}

/// Diagnostics get wrapped and boxed to fit the terminal, so compare without any of that
fn squashed(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '│' | '×' | '╰' | '─' | '╭'))
        .collect()
}

#[test]
fn test_version() {
    let output = run(&["-V"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stderr(&output), "");

    let (name, ver) = stdout(&output).split_once(' ').unwrap();
    assert_eq!(name, "binfetch");
    let mut ver_parts = ver.trim().split('.');
    ver_parts.next().unwrap().parse::<u8>().unwrap();
    ver_parts.next().unwrap().parse::<u8>().unwrap();
    ver_parts.next().unwrap().parse::<u8>().unwrap();
    assert!(ver_parts.next().is_none());
}

#[test]
fn test_help_lists_subcommands() {
    let output = run(&["--help"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let help = stdout(&output);
    assert!(help.contains("generate"));
    assert!(help.contains("config-schema"));
    assert!(help.contains("--repo"));
    assert!(help.contains("--no-timestamp"));
}

#[test]
fn test_generate_to_stdout() {
    let output = run(&["--no-timestamp", &fixture("simple.yml")]);
    assert!(output.status.success(), "{}", stderr(&output));
    let script = stdout(&output);
    assert!(script.starts_with("#!/bin/sh\n"));
    assert!(script.contains("\nNAME=${BINARY}_${VERSION}_${OS}_${ARCH}\n"));
    assert!(script.contains("    linux/amd64) found=0 ;;\n"));
    assert!(script.contains("    darwin/amd64) found=0 ;;\n"));
    let header = script.lines().nth(2).unwrap();
    assert!(header.ends_with(". DO NOT EDIT."), "{header}");
    assert!(!header.contains(" on "), "{header}");
}

#[test]
fn test_generate_subcommand_matches_default() {
    let implicit = run(&["--no-timestamp", &fixture("simple.yml")]);
    let explicit = run(&["generate", "--no-timestamp", &fixture("simple.yml")]);
    assert!(explicit.status.success(), "{}", stderr(&explicit));
    assert_eq!(stdout(&implicit), stdout(&explicit));
}

#[test]
fn test_repo_fills_in_owner() {
    let output = run(&[
        "--no-timestamp",
        "--repo",
        "https://github.com/foo/bar.git",
        &fixture("arm.yml"),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let script = stdout(&output);
    assert!(script.contains("\nOWNER=foo\n"));
    assert!(script.contains("    linux/armv7) found=0 ;;\n"));
    assert!(script.contains("    darwin/armv6) found=1 ;;\n"));
    assert!(script.contains("    windows) FORMAT=zip ;;\n"));
}

#[test]
fn test_missing_repo() {
    let output = run(&["--no-timestamp", &fixture("arm.yml")]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "");
    assert!(squashed(stderr(&output)).contains("owner/namereponotspecified"));
}

#[test]
fn test_unsupported_conditional() {
    let output = run(&["--no-timestamp", &fixture("conditional.yml")]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "");
    assert!(squashed(stderr(&output)).contains("unknownconditionalorARMformat"));
}

#[test]
fn test_no_input() {
    let output = run(&[]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "");
    assert!(squashed(stderr(&output)).contains("repoorfilenotspecified"));
}

#[test]
fn test_output_file_lifecycle() {
    let tmp = temp_dir::TempDir::new().unwrap();
    let dest = Utf8PathBuf::from_path_buf(tmp.path().join("install.sh")).unwrap();
    let simple = fixture("simple.yml");

    // first write
    let output = run(&["-o", dest.as_str(), &simple]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "");
    let first = std::fs::read_to_string(&dest).unwrap();
    assert!(first.starts_with("#!/bin/sh\n"));

    // a new timestamp alone doesn't rewrite the file
    let output = run(&["-o", dest.as_str(), "--no-timestamp", &simple]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), first);

    // unless forced
    let output = run(&["-o", dest.as_str(), "--no-timestamp", "--force", &simple]);
    assert!(output.status.success(), "{}", stderr(&output));
    let forced = std::fs::read_to_string(&dest).unwrap();
    assert_ne!(forced, first);

    // --check accepts what we just wrote
    let output = run(&["-o", dest.as_str(), "--no-timestamp", "--check", &simple]);
    assert!(output.status.success(), "{}", stderr(&output));

    // and rejects a hand-edited file
    std::fs::write(&dest, format!("{forced}echo tampered\n")).unwrap();
    let output = run(&["-o", dest.as_str(), "--no-timestamp", "--check", &simple]);
    assert!(!output.status.success());
    assert!(squashed(stderr(&output)).contains("-echotampered"));
    assert!(std::fs::read_to_string(&dest)
        .unwrap()
        .ends_with("echo tampered\n"));
}

#[test]
fn test_check_with_timestamps() {
    let tmp = temp_dir::TempDir::new().unwrap();
    let dest = Utf8PathBuf::from_path_buf(tmp.path().join("install.sh")).unwrap();
    let simple = fixture("simple.yml");

    let output = run(&["-o", dest.as_str(), &simple]);
    assert!(output.status.success(), "{}", stderr(&output));
    let written = std::fs::read_to_string(&dest).unwrap();
    assert!(written.lines().nth(2).unwrap().contains(" on "));

    // make sure the next run gets a different timestamp
    std::thread::sleep(std::time::Duration::from_millis(1100));

    let output = run(&["-o", dest.as_str(), "--check", &simple]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), written);
}

#[test]
fn test_check_requires_output() {
    let output = run(&["--check", &fixture("simple.yml")]);
    assert!(!output.status.success());
}

#[test]
fn test_config_schema() {
    let output = run(&["config-schema"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let schema: serde_json::Value = serde_json::from_str(stdout(&output)).unwrap();
    assert_eq!(schema["title"], "Project");
    assert!(schema["definitions"]["Archive"].is_object());
}
