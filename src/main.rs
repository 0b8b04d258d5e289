use anyhow::Result;
use clap::Parser;
use console::Term;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcribe_media::cli::{self, Cli, Commands, TranscribeArgs};
use transcribe_media::config::Config;
use transcribe_media::{utils, MediaMode, TranscriptionPipeline, TranscriptorError};

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "transcribe_media=debug"
    } else {
        "transcribe_media=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match cli.command.take() {
        Some(Commands::Config { show }) => {
            let config = Config::load(cli.config.as_deref())?;
            if show {
                config.display();
            } else {
                println!("Edit the configuration file to change settings:");
                match &cli.config {
                    Some(path) => println!("  {}", path.display()),
                    None => println!("  {}", Config::config_path()?.display()),
                }
            }
        }
        Some(Commands::Transcribe(args)) => transcribe_and_report(&cli, args).await,
        None => {
            let args = std::mem::take(&mut cli.transcribe);
            transcribe_and_report(&cli, args).await
        }
    }

    Ok(())
}

/// Every failure of a run is printed, never propagated
async fn transcribe_and_report(cli: &Cli, args: TranscribeArgs) {
    if let Err(e) = transcribe(cli, args).await {
        println!("Error: {:#}", e);
        if let Some(hint) = e.downcast_ref::<TranscriptorError>().and_then(TranscriptorError::hint) {
            println!("Note: {}", hint);
        }
    }
}

async fn transcribe(cli: &Cli, args: TranscribeArgs) -> Result<()> {
    let term = Term::stdout();

    // mode is settled before anything touches the network
    let mode = match args.mode.as_deref() {
        Some(raw) => raw.parse::<MediaMode>()?,
        None => cli::prompt_mode(&term)?,
    };
    let url = match args.url.clone() {
        Some(url) => url,
        None => cli::prompt_url(&term)?,
    };

    let config = apply_overrides(Config::load(cli.config.as_deref())?, &args)?;

    let missing_deps = utils::check_dependencies(&config).await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    let pipeline = TranscriptionPipeline::new(&config);
    let outcome = pipeline.run(&url, mode).await?;

    tracing::info!(
        "Transcribed {} of audio in {} chunk(s)",
        utils::format_duration(outcome.transcript.audio_duration),
        outcome.transcript.segments.len()
    );
    println!("Transcription saved to: {}", outcome.transcript_path.display());

    if let Some(audio_path) = outcome.audio_path {
        println!("Audio saved to: {}", audio_path.display());
    }

    Ok(())
}

/// Command line flags win over the configuration file
fn apply_overrides(mut config: Config, args: &TranscribeArgs) -> Result<Config> {
    if let Some(model) = &args.model {
        config.model.path = model.clone();
    }
    if let Some(language) = &args.language {
        config.model.language = Some(language.clone());
    }
    if let Some(ffmpeg) = &args.ffmpeg {
        config.download.ffmpeg_location = Some(ffmpeg.clone());
    }
    if let Some(yt_dlp) = &args.yt_dlp {
        config.download.yt_dlp_path = yt_dlp.clone();
    }
    if args.keep_audio {
        config.download.keep_audio = true;
    }
    if let Some(chunk_seconds) = args.chunk_seconds {
        config.transcription.chunk_seconds = chunk_seconds;
    }
    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }

    config.validate()?;
    Ok(config)
}
