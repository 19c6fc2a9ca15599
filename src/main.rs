// src/main.rs

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use trim_audio_lib::audio::types::{DEFAULT_COPY_SUFFIX, DEFAULT_MAX_DURATION_MS};
use trim_audio_lib::{
    process_directory, AudioError, EncoderConfig, OutputMode, ScanConfig, TrimConfig, TrimPolicy,
};

/// How per-file results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    /// One status line per file
    Text,
    /// One JSON object per line
    Json,
}

/// Command-line tool for trimming a directory of audio files
#[derive(Parser, Debug)]
#[command(name = "trim-audio")]
#[command(about = "Trim all audio files in a directory to 2 minutes and 32 seconds", long_about = None)]
struct Args {
    /// Path to the target directory containing audio files
    directory: PathBuf,

    /// Overwrite the original files or save trimmed copies.
    /// Copies replace any existing file of the same name.
    #[arg(long, value_enum, default_value_t = OutputMode::Overwrite)]
    output: OutputMode,

    /// Maximum duration in milliseconds
    #[arg(long, default_value_t = DEFAULT_MAX_DURATION_MS)]
    max_duration_ms: u64,

    /// Suffix inserted before the extension in copy mode
    #[arg(long, default_value = DEFAULT_COPY_SUFFIX)]
    suffix: String,

    /// ffmpeg executable used to encode compressed formats
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Output format for per-file results
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,

    /// Show detailed information
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing with environment filter support
    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let config = TrimConfig {
        policy: TrimPolicy::new(args.max_duration_ms),
        scan: ScanConfig {
            copy_suffix: args.suffix,
            ..ScanConfig::default()
        },
        encoder: EncoderConfig {
            ffmpeg: args.ffmpeg,
        },
    };

    let result = process_directory(&args.directory, args.output, &config, |report| {
        match args.report {
            ReportFormat::Text => println!("{}", report),
            ReportFormat::Json => println!("{}", report.to_json()),
        }
    });

    match result {
        Ok(_) => Ok(()),
        Err(err @ AudioError::InvalidDirectory(_)) => {
            println!("{}", err);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
