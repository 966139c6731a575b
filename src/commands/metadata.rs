//! Metadata command handler.

use anyhow::{Context, Result};
use audiofetch_core::{ArchiveClient, Config};

use crate::cli::MetadataArgs;

pub async fn run_metadata_command(args: &MetadataArgs, config: &Config) -> Result<()> {
    let client = ArchiveClient::with_base_url(&config.base_url, config.api_key())?;
    let metadata = client
        .metadata(&args.identifier)
        .await
        .with_context(|| format!("failed to fetch metadata for '{}'", args.identifier))?;

    super::print_json(&metadata)
}
