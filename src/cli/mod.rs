use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "transcriber",
    about = "Video Transcriber - text from YouTube videos via captions or AWS Transcribe",
    version,
    long_about = "Turns a YouTube video into text. Existing caption tracks are used when present; otherwise the audio is downloaded, trimmed, uploaded to S3 and transcribed with AWS Transcribe."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to bind (defaults to the configured host)
        #[arg(long, env = "HOST")]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Directory with the static front-end
        #[arg(long, value_name = "DIR")]
        frontend_dir: Option<PathBuf>,
    },

    /// Transcribe one video and print or save the result
    Transcribe {
        /// Video URL
        #[arg(value_name = "URL")]
        url: String,

        /// Caption language to look for before falling back to audio
        #[arg(short, long, value_name = "LANG")]
        lang: Option<String>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or write the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with word timings
    Json,
    /// SRT subtitle format
    Srt,
    /// Ten-second timestamped blocks
    Blocks,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Blocks => write!(f, "blocks"),
        }
    }
}
