use clap::{Args, Parser, Subcommand, ValueEnum};
use console::Term;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::extractors::MediaMode;

#[derive(Parser)]
#[command(
    name = "transcribe-media",
    about = "Download audio from a URL and transcribe it locally with Whisper",
    version,
    long_about = "Fetches best-available audio with yt-dlp (direct files, YouTube, RSS pages or DASH manifests), \
                  transcribes it in 30-second chunks with a local Whisper model and saves the text to a timestamped file.",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Transcription options used when no subcommand is given
    #[command(flatten)]
    pub transcribe: TranscribeArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download and transcribe media (default; prompts for anything not given)
    Transcribe(TranscribeArgs),

    /// Show or locate the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct TranscribeArgs {
    /// Media URL (prompted if omitted)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// 1 = direct audio / YouTube / RSS page, 2 = DASH manifest URL (prompted if omitted)
    #[arg(short, long, value_name = "1|2")]
    pub mode: Option<String>,

    /// Whisper GGML model file
    #[arg(long, value_name = "PATH", env = "TRANSCRIBE_MEDIA_MODEL")]
    pub model: Option<PathBuf>,

    /// FFmpeg binary or directory used for merging streams
    #[arg(long, value_name = "PATH", env = "TRANSCRIBE_MEDIA_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// yt-dlp executable
    #[arg(long, value_name = "PATH")]
    pub yt_dlp: Option<String>,

    /// Directory receiving the transcript
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Maximum chunk length in seconds
    #[arg(long, value_name = "SECONDS")]
    pub chunk_seconds: Option<u32>,

    /// Language code for transcription (auto-detect if not specified)
    #[arg(short, long, value_name = "LANG")]
    pub language: Option<String>,

    /// Keep the downloaded audio file after a successful run
    #[arg(long)]
    pub keep_audio: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, one line per chunk
    #[default]
    Text,
    /// JSON with chunk timings
    Json,
    /// SRT subtitle format, one cue per chunk
    Srt,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Srt => write!(f, "srt"),
        }
    }
}

/// Ask for the media type, showing the menu first.
pub fn prompt_mode(term: &Term) -> crate::Result<MediaMode> {
    term.write_line("Choose media type:")?;
    term.write_line(&format!("{}", MediaMode::Direct))?;
    term.write_line(&format!("{}", MediaMode::Dash))?;
    term.write_str("Enter 1 or 2: ")?;

    let answer = read_answer(term)?;
    Ok(answer.parse::<MediaMode>()?)
}

/// Ask for the media URL.
pub fn prompt_url(term: &Term) -> crate::Result<String> {
    term.write_str("Enter the media URL: ")?;
    Ok(read_answer(term)?.trim().to_string())
}

/// Read one line, falling back to plain stdin when input is piped.
fn read_answer(term: &Term) -> std::io::Result<String> {
    if term.is_term() && std::io::stdin().is_terminal() {
        return term.read_line();
    }

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["transcribe-media"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.transcribe.url.is_none());
        assert!(cli.transcribe.mode.is_none());
    }

    #[test]
    fn test_default_command_takes_transcribe_options() {
        let cli = Cli::try_parse_from([
            "transcribe-media",
            "--mode",
            "1",
            "--model",
            "/models/ggml-base.bin",
            "--keep-audio",
            "https://example.com/audio.mp3",
        ])
        .unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.transcribe.mode.as_deref(), Some("1"));
        assert_eq!(cli.transcribe.model, Some(PathBuf::from("/models/ggml-base.bin")));
        assert!(cli.transcribe.keep_audio);
        assert_eq!(cli.transcribe.url.as_deref(), Some("https://example.com/audio.mp3"));
    }

    #[test]
    fn test_transcribe_args() {
        let cli = Cli::try_parse_from([
            "transcribe-media",
            "transcribe",
            "--mode",
            "2",
            "--format",
            "srt",
            "--chunk-seconds",
            "20",
            "https://example.com/manifest.mpd",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Transcribe(args)) => {
                assert_eq!(args.mode.as_deref(), Some("2"));
                assert_eq!(args.format, Some(OutputFormat::Srt));
                assert_eq!(args.chunk_seconds, Some(20));
                assert_eq!(args.url.as_deref(), Some("https://example.com/manifest.mpd"));
            }
            _ => panic!("expected transcribe command"),
        }
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(OutputFormat::Text.extension(), "txt");
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::Srt.to_string(), "srt");
    }
}
