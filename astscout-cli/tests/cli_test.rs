use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::File;
use std::io::Write;
use tempfile::{tempdir, TempDir};

fn create_test_files(dir: &TempDir, files: &[(&str, &str)]) -> Result<()> {
    for (name, content) in files {
        let file_path = dir.path().join(name);
        let mut file = File::create(file_path)?;
        writeln!(file, "{}", content)?;
    }
    Ok(())
}

fn astscout(dir: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("astscout-cli")?;
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    Ok(cmd)
}

const SAMPLE: &str = r#"package main

import "fmt"

// banana republic
var greeting = "an apple a day"

func main() {
	fmt.Println(greeting)
}"#;

#[test]
fn test_no_paths_prints_usage() -> Result<()> {
    let dir = tempdir()?;
    astscout(&dir)?
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn test_string_match_is_printed_with_position() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("sample.go", SAMPLE)])?;

    astscout(&dir)?
        .args(["--no-color", "-s", "apple", "sample.go"])
        .assert()
        .success()
        .stdout(predicate::str::diff("sample.go:6:20\t\"an apple a day\"\n"));
    Ok(())
}

#[test]
fn test_all_criteria_together() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("sample.go", SAMPLE)])?;

    let assert = astscout(&dir)?
        .args([
            "--no-color",
            "-s",
            "apple",
            "-c",
            "banana",
            "-v",
            "greet",
            "sample.go",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let mut lines: Vec<&str> = stdout.lines().collect();
    lines.sort();
    assert_eq!(
        lines,
        vec![
            "sample.go:5:4\t// banana republic",
            "sample.go:6:20\t\"an apple a day\"",
            "sample.go:6:5\tgreeting",
        ]
    );
    Ok(())
}

#[test]
fn test_match_is_highlighted_in_red() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("sample.go", SAMPLE)])?;

    astscout(&dir)?
        .env_remove("NO_COLOR")
        .env("CLICOLOR_FORCE", "1")
        .args(["-s", "apple", "sample.go"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "sample.go:6:20\t\"an \x1b[31mapple\x1b[0m a day\"",
        ));
    Ok(())
}

#[test]
fn test_import_paths_are_not_searched() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("sample.go", SAMPLE)])?;

    astscout(&dir)?
        .args(["-s", "fmt", "sample.go"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    Ok(())
}

#[test]
fn test_invalid_pattern_fails_before_output() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("sample.go", SAMPLE)])?;

    astscout(&dir)?
        .args(["-c", "(unclosed", "sample.go"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid pattern '(unclosed'"));
    Ok(())
}

#[test]
fn test_broken_file_is_reported_and_skipped() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[
            ("broken.go", "package main\n\nfunc main( {\n"),
            ("sample.go", SAMPLE),
        ],
    )?;

    astscout(&dir)?
        .args(["--no-color", "--stats", "-s", "apple", "broken.go", "sample.go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sample.go:6:20"))
        .stdout(predicate::str::contains("broken.go").not())
        .stderr(predicate::str::contains("syntax error"))
        .stderr(predicate::str::contains(
            "Found 1 matches in 1 files (1 failed to parse)",
        ));
    Ok(())
}

#[test]
fn test_no_patterns_still_parses() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("sample.go", SAMPLE), ("other.go", "package x")])?;

    astscout(&dir)?
        .args(["--stats", "sample.go", "other.go"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Found 0 matches in 0 files (0 failed to parse)",
        ));
    Ok(())
}

#[test]
fn test_config_file_supplies_patterns() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        &dir,
        &[
            ("sample.go", SAMPLE),
            ("search.yaml", "comment_pattern: \"republic\"\nthread_count: 2"),
        ],
    )?;

    astscout(&dir)?
        .args(["--no-color", "--config", "search.yaml", "sample.go"])
        .assert()
        .success()
        .stdout(predicate::str::diff("sample.go:5:11\t// banana republic\n"));
    Ok(())
}

#[test]
fn test_missing_config_file_is_fatal() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(&dir, &[("sample.go", SAMPLE)])?;

    astscout(&dir)?
        .args(["--config", "nowhere.yaml", "sample.go"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
    Ok(())
}
