//! Command-line surface over the core `Scan`/`Collections`/`ExtractTelemetry`/`ProbeEncoders`/
//! `StartExport` operations (§6).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "td", author, version, about = "Tesla dashcam post-processing engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk a footage root and report every recognized day collection.
    Scan {
        /// Root directory containing RecentClips/SentryClips/SavedClips.
        root: PathBuf,
    },
    /// Probe the system's FFmpeg for hardware encoder capability.
    ProbeEncoders {
        /// Override the discovered ffmpeg binary.
        #[arg(long)]
        ffmpeg_path: Option<PathBuf>,
    },
    /// Extract telemetry samples and a GPS path for a collection's time range.
    ExtractTelemetry {
        root: PathBuf,
        /// Collection id as printed by `scan` (`<ClipType>:<day>:<discriminator>`).
        #[arg(long)]
        collection_id: String,
        #[arg(long)]
        start_ms: i64,
        #[arg(long)]
        end_ms: i64,
    },
    /// Plan and render an export, streaming progress as newline-delimited JSON on stdout.
    Export(Box<ExportArgs>),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    pub root: PathBuf,
    /// Collection id as printed by `scan`.
    #[arg(long)]
    pub collection_id: String,
    #[arg(long)]
    pub start_ms: i64,
    #[arg(long)]
    pub end_ms: i64,
    /// Comma-separated camera tokens, e.g. `front,back,left_repeater`.
    #[arg(long, value_delimiter = ',')]
    pub cameras: Vec<String>,
    #[arg(long)]
    pub output: PathBuf,
    #[arg(long, value_enum, default_value = "medium")]
    pub quality: QualityArg,
    #[arg(long)]
    pub mirror_cameras: bool,
    #[arg(long)]
    pub metric: bool,
    #[arg(long, default_value = "en")]
    pub language: String,
    #[arg(long)]
    pub dashboard: bool,
    #[arg(long)]
    pub minimap: bool,
    #[arg(long)]
    pub timestamp: bool,
    #[arg(long)]
    pub timelapse_speed: Option<f64>,
    #[arg(long)]
    pub ffmpeg_path: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum QualityArg {
    Mobile,
    Medium,
    High,
    Max,
}

impl From<QualityArg> for td_models::Quality {
    fn from(value: QualityArg) -> Self {
        match value {
            QualityArg::Mobile => td_models::Quality::Mobile,
            QualityArg::Medium => td_models::Quality::Medium,
            QualityArg::High => td_models::Quality::High,
            QualityArg::Max => td_models::Quality::Max,
        }
    }
}
