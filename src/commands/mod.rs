//! CLI command handlers.

mod config;
mod download;
mod metadata;
mod search;

use anyhow::{Context, Result};
use serde::Serialize;

pub use config::run_config_show_command;
pub use download::run_download_command;
pub use metadata::run_metadata_command;
pub use search::run_search_command;

/// Writes `value` to stdout as pretty JSON.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}
