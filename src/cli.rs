//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use audiofetch_core::MergeInstruction;

/// Fetch audio from the Internet Archive and reassemble multi-part files.
///
/// Audiofetch downloads an item's audio in your preferred encodings, skips
/// files already on disk, and concatenates files split into numbered parts.
#[derive(Parser, Debug)]
#[command(name = "audiofetch")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search openly licensed audio items
    Search(SearchArgs),
    /// Show metadata and the file listing of an item
    Metadata(MetadataArgs),
    /// Download an item's audio and merge multi-part files
    Download(DownloadArgs),
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
}

/// Arguments for `search`.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Maximum number of results (default: IA_MAX_RESULTS or 10)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=10000))]
    pub max_results: Option<u32>,
}

/// Arguments for `metadata`.
#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Item identifier
    pub identifier: String,
}

/// Arguments for `download`.
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Item identifier
    pub identifier: String,

    /// Merge multi-part files regardless of their size
    #[arg(long, conflicts_with = "no_concat")]
    pub concat: bool,

    /// Only report multi-part files, never merge
    #[arg(long)]
    pub no_concat: bool,

    /// Download root; the item is written to <DIR>/<identifier>
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// ffmpeg executable used for merging
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Part count at which merging waits for --concat
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub ask_threshold: Option<u64>,

    /// Preferred formats, highest priority first (e.g. flac,mp3)
    #[arg(long, value_name = "LIST")]
    pub formats: Option<String>,
}

impl DownloadArgs {
    /// The merge instruction selected by `--concat` / `--no-concat`.
    #[must_use]
    pub fn merge_instruction(&self) -> MergeInstruction {
        if self.concat {
            MergeInstruction::Merge
        } else if self.no_concat {
            MergeInstruction::DoNotMerge
        } else {
            MergeInstruction::Auto
        }
    }
}
