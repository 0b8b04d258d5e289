use std::path::Path;

use crate::config::Config;

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Resolve the ffmpeg binary yt-dlp will end up using.
///
/// `ffmpeg_location` may name the binary itself or the directory containing it.
pub fn ffmpeg_command(ffmpeg_location: Option<&Path>) -> String {
    match ffmpeg_location {
        Some(location) if location.is_dir() => {
            let binary = if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" };
            location.join(binary).to_string_lossy().into_owned()
        }
        Some(location) => location.to_string_lossy().into_owned(),
        None => "ffmpeg".to_string(),
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies(config: &Config) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(&config.download.yt_dlp_path, "--version").await {
        missing.push(format!(
            "{} - required for downloading media",
            config.download.yt_dlp_path
        ));
    }

    let ffmpeg = ffmpeg_command(config.download.ffmpeg_location.as_deref());
    if !check_command_available(&ffmpeg, "-version").await {
        missing.push(format!(
            "{} - required for audio extraction and DASH merging",
            ffmpeg
        ));
    }

    missing
}

/// Check if a command can be run
async fn check_command_available(command: &str, version_flag: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg(version_flag)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }

    #[test]
    fn test_ffmpeg_command() {
        assert_eq!(ffmpeg_command(None), "ffmpeg");
        assert_eq!(
            ffmpeg_command(Some(Path::new("/nonexistent/bin/ffmpeg"))),
            "/nonexistent/bin/ffmpeg"
        );

        let dir = tempfile::tempdir().unwrap();
        let resolved = PathBuf::from(ffmpeg_command(Some(dir.path())));
        assert_eq!(resolved.parent().unwrap(), dir.path());
    }

    #[test]
    fn test_missing_tools_are_listed() {
        let mut config = Config::default();
        config.download.yt_dlp_path = "/nonexistent/yt-dlp".to_string();
        config.download.ffmpeg_location = Some(PathBuf::from("/nonexistent/ffmpeg"));

        let missing = tokio_test::block_on(check_dependencies(&config));
        assert_eq!(missing.len(), 2);
        assert!(missing[0].starts_with("/nonexistent/yt-dlp"));
        assert!(missing[1].starts_with("/nonexistent/ffmpeg"));
    }
}
