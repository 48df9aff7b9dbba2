//! Command-line front end for the Tesla dashcam post-processing engine.

mod cli;
mod commands;
mod decoder;
mod exit_code;
mod scan;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Command};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("td=info".parse().unwrap()))
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Command::Scan { root } => commands::scan_root(&root).await,
        Command::ProbeEncoders { ffmpeg_path } => {
            commands::probe_encoders(ffmpeg_path.as_deref()).await
        }
        Command::ExtractTelemetry {
            root,
            collection_id,
            start_ms,
            end_ms,
        } => commands::extract_telemetry(&root, &collection_id, start_ms, end_ms).await,
        Command::Export(args) => commands::export(&args).await,
    };

    std::process::exit(code);
}
