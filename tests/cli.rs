use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn batchzip() -> Command {
    let mut cmd = Command::cargo_bin("batchzip").unwrap();
    cmd.env_remove("ZIPPER_PASSWORD")
        .env_remove("ZIPPER_INPUT_FOLDER")
        .env_remove("ZIPPER_OUTPUT_FOLDER")
        .env_remove("ZIPPER_THREADS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_archives_folder_and_reports() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup: an input folder with a couple of files
    let root = tempdir()?;
    let input = root.path().join("input");
    let output = root.path().join("output");
    fs::create_dir(&input)?;
    fs::write(input.join("file1.txt"), "Hello, this is the first file.\n".repeat(20))?;
    fs::write(input.join("file2.log"), "Some log data here.\n")?;

    // 2. Run with the password from the environment
    batchzip()
        .env("ZIPPER_PASSWORD", "env-secret")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Found 2 files to process")
                .and(predicate::str::contains("Files processed: 2"))
                .and(predicate::str::contains("Files failed: 0"))
                .and(predicate::str::contains("Total files: 2"))
                .and(predicate::str::contains("file1.txt.zip"))
                .and(predicate::str::contains("Generated files-list.json with 2 entries")),
        );

    // 3. Verify outputs
    let (name, data) = batchzip::archive::read_single_entry(&output.join("file1.txt.zip"), "env-secret")?;
    assert_eq!(name, "file1.txt");
    assert_eq!(data, fs::read(input.join("file1.txt"))?);
    assert!(output.join("file2.log.zip").exists());
    assert!(output.join("files-list.json").exists());

    // 4. A second run has nothing to do
    batchzip()
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--password")
        .arg("env-secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("No new files to process."));

    Ok(())
}

#[test]
fn test_cli_missing_password_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let input = root.path().join("input");
    let output = root.path().join("output");
    fs::create_dir(&input)?;
    fs::write(input.join("a.txt"), "a")?;

    batchzip()
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Password not provided"));

    // nothing was attempted
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_cli_missing_input_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    batchzip()
        .arg("--input")
        .arg(root.path().join("nope"))
        .arg("--output")
        .arg(root.path().join("out"))
        .arg("--password")
        .arg("pw")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input folder does not exist"));
    Ok(())
}

#[test]
fn test_cli_failed_task_sets_exit_code() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempdir()?;
    let input = root.path().join("input");
    let output = root.path().join("output");
    fs::create_dir(&input)?;
    fs::create_dir(&output)?;
    fs::write(input.join("good.txt"), "good")?;
    fs::write(input.join("bad.txt"), "bad")?;
    fs::create_dir(output.join("bad.txt.zip"))?;

    batchzip()
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--password")
        .arg("pw")
        .assert()
        .failure()
        .stdout(
            predicate::str::contains("Files failed: 1")
                .and(predicate::str::contains("Process completed with errors")),
        );
    assert!(output.join("good.txt.zip").is_file());
    Ok(())
}
