//! CLI entry point for audiofetch.

use anyhow::{Context, Result};
use audiofetch_core::{Config, format::parse_format_list};
use clap::Parser;
use tracing::debug;

mod cli;
mod commands;

use cli::{Cli, Command, ConfigCommand, DownloadArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the JSON result, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?cli, "CLI arguments parsed");

    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Command::Download(args) = &cli.command {
        apply_download_overrides(&mut config, args)?;
    }
    config.validate()?;

    match &cli.command {
        Command::Search(args) => commands::run_search_command(args, &config).await,
        Command::Metadata(args) => commands::run_metadata_command(args, &config).await,
        Command::Download(args) => commands::run_download_command(args, &config).await,
        Command::Config {
            command: ConfigCommand::Show,
        } => commands::run_config_show_command(&config),
    }
}

/// Command-line values take precedence over the environment.
fn apply_download_overrides(config: &mut Config, args: &DownloadArgs) -> Result<()> {
    if let Some(dir) = &args.output_dir {
        config.download_dir.clone_from(dir);
    }
    if let Some(ffmpeg) = &args.ffmpeg {
        config.ffmpeg.clone_from(ffmpeg);
    }
    if let Some(threshold) = args.ask_threshold {
        config.ask_threshold =
            usize::try_from(threshold).context("ask threshold does not fit this platform")?;
    }
    if let Some(formats) = &args.formats {
        config.formats = parse_format_list(formats).context("invalid --formats value")?;
    }
    Ok(())
}
