//! Search command handler.

use anyhow::{Context, Result};
use audiofetch_core::{ArchiveClient, Config};
use tracing::info;

use crate::cli::SearchArgs;

pub async fn run_search_command(args: &SearchArgs, config: &Config) -> Result<()> {
    let client = ArchiveClient::with_base_url(&config.base_url, config.api_key())?;
    let max_results = args.max_results.unwrap_or(config.max_results);

    let results = client
        .search(&args.query, max_results)
        .await
        .with_context(|| format!("search for '{}' failed", args.query))?;
    info!(
        found = results.num_found,
        returned = results.docs.len(),
        "search complete"
    );

    super::print_json(&results)
}
