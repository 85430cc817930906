use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("transcriber")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("transcribe"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_transcribe_requires_url() {
    Command::cargo_bin("transcriber")
        .unwrap()
        .arg("transcribe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<URL>"));
}

#[test]
fn test_unknown_format_is_rejected() {
    Command::cargo_bin("transcriber")
        .unwrap()
        .args(["transcribe", "https://youtu.be/x", "--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_config_show_prints_defaults() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("transcriber")
        .unwrap()
        .current_dir(dir.path())
        .env("BUCKET_NAME", "cli-test-bucket")
        .env("XDG_CONFIG_HOME", dir.path())
        .env("HOME", dir.path())
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S3 Bucket: cli-test-bucket"))
        .stdout(predicate::str::contains("Trim Offset: 18s"));
}

/// A yt-dlp stand-in that records each call and then fails
#[cfg(unix)]
fn recording_yt_dlp(dir: &std::path::Path) -> (String, std::path::PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.join("bin");
    fs_err::create_dir_all(&bin).unwrap();
    let calls = dir.join("yt-dlp-calls");
    let script = bin.join("yt-dlp");
    fs_err::write(
        &script,
        format!("#!/bin/sh\necho \"$@\" >> '{}'\nexit 1\n", calls.display()),
    )
    .unwrap();
    fs_err::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let path = format!("{}:{}", bin.display(), std::env::var("PATH").unwrap_or_default());
    (path, calls)
}

#[cfg(unix)]
fn isolated(dir: &std::path::Path, path: &str) -> Command {
    let mut cmd = Command::cargo_bin("transcriber").unwrap();
    cmd.current_dir(dir)
        .env("PATH", path)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("TRANSCRIBER_WORK_DIR", dir.join("work"))
        .env("AWS_EC2_METADATA_DISABLED", "true")
        .env_remove("TRANSCRIBER_CREDENTIALS")
        .env_remove("LOG_FORMAT");
    cmd
}

#[cfg(unix)]
#[test]
fn test_blank_url_is_rejected_before_any_download() {
    let dir = tempfile::tempdir().unwrap();
    let (path, calls) = recording_yt_dlp(dir.path());

    isolated(dir.path(), &path)
        .args(["transcribe", "   ", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No URL provided"));

    assert!(!calls.exists());
}

#[cfg(unix)]
#[test]
fn test_logs_stay_off_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let (path, calls) = recording_yt_dlp(dir.path());

    isolated(dir.path(), &path)
        .env("RUST_LOG", "video_transcriber=debug")
        .args(["transcribe", "https://youtu.be/x", "-q", "--format", "json"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Pipelines ready"));

    assert!(calls.exists());
}
