use assert_cmd::Command;
use predicates::prelude::*;

fn transcriber(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("transcribe-media").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env_remove("TRANSCRIBE_MEDIA_MODEL")
        .env_remove("TRANSCRIBE_MEDIA_FFMPEG");
    cmd
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();

    transcriber(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("transcribe"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn invalid_mode_flag_is_reported_before_any_work() {
    let home = tempfile::tempdir().unwrap();

    transcriber(home.path())
        .args(["transcribe", "--mode", "3", "https://example.com/audio.mp3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Error: Invalid mode \"3\", must be 1 or 2"))
        .stdout(predicate::str::contains("Downloaded audio").not());

    assert!(!home.path().join("transcriptions").exists());
    assert!(!home.path().join(".config").exists());
}

#[test]
fn invalid_mode_prompt_answer_is_reported() {
    let home = tempfile::tempdir().unwrap();

    transcriber(home.path())
        .write_stdin("banana\nhttps://example.com/audio.mp3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Choose media type:"))
        .stdout(predicate::str::contains("2 = DASH manifest URL"))
        .stdout(predicate::str::contains("Error: Invalid mode \"banana\", must be 1 or 2"));

    assert!(!home.path().join("transcriptions").exists());
}

#[test]
fn failed_download_writes_no_transcript() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("config.yaml");

    transcriber(home.path())
        .args(["--config", config.to_str().unwrap()])
        .args(["transcribe", "--mode", "2", "--yt-dlp", "/nonexistent/yt-dlp"])
        .arg("https://example.com/manifest.mpd")
        .assert()
        .success()
        .stdout(predicate::str::contains("Error: /nonexistent/yt-dlp is not available"));

    assert!(config.exists());
    assert!(!home.path().join("transcriptions").exists());
}

#[test]
fn config_show_prints_settings() {
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("settings.yaml");
    std::fs::write(&config, "transcription:\n  chunk_seconds: 20\n").unwrap();

    transcriber(home.path())
        .args(["--config", config.to_str().unwrap(), "config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Chunk Length: 20s"))
        .stdout(predicate::str::contains("Output Directory: ./transcriptions"));
}

#[cfg(unix)]
#[test]
fn bare_command_reads_model_and_ffmpeg_from_env() {
    use std::os::unix::fs::PermissionsExt;

    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("config.yaml");
    std::fs::write(
        &config,
        format!("download:\n  temp_dir: {}\n", home.path().join("runs").display()),
    )
    .unwrap();

    // records its arguments and "downloads" an empty file
    let args_log = home.path().join("yt-dlp-args.txt");
    let script = home.path().join("yt-dlp");
    std::fs::write(
        &script,
        format!(
            r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo 2024.08.06; exit 0; fi
printf '%s\n' "$@" > "{log}"
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; fi
  shift
done
file="$(dirname "$out")/audio.m4a"
touch "$file"
echo "$file"
"#,
            log = args_log.display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    transcriber(home.path())
        .env("TRANSCRIBE_MEDIA_MODEL", "/models/from-env.bin")
        .env("TRANSCRIBE_MEDIA_FFMPEG", "/opt/ffmpeg-from-env")
        .args(["--config", config.to_str().unwrap()])
        .args(["--yt-dlp", script.to_str().unwrap(), "--mode", "1"])
        .arg("https://example.com/audio.mp3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Downloaded audio to:"))
        .stdout(predicate::str::contains(
            "Error: Failed to load model /models/from-env.bin: model file not found",
        ));

    let recorded = std::fs::read_to_string(&args_log).unwrap();
    assert!(recorded.contains("--ffmpeg-location\n/opt/ffmpeg-from-env\n"), "{recorded}");
    assert!(!home.path().join("transcriptions").exists());
}
