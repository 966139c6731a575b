//! Download command handler: fetch an item, then detect and merge parts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use audiofetch_core::{ArchiveClient, Config, Ffmpeg, Pipeline};
use tracing::{info, warn};

use crate::cli::DownloadArgs;

pub async fn run_download_command(args: &DownloadArgs, config: &Config) -> Result<()> {
    let client = ArchiveClient::with_base_url(&config.base_url, config.api_key())?;
    let metadata = client
        .metadata(&args.identifier)
        .await
        .with_context(|| format!("failed to fetch metadata for '{}'", args.identifier))?;
    let files = metadata.remote_files();
    info!(item = %args.identifier, files = files.len(), "item listing fetched");

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_signal = Arc::clone(&interrupted);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupted_signal.store(true, Ordering::SeqCst);
        }
    });

    let pipeline = Pipeline::new(
        Arc::new(client),
        Arc::new(Ffmpeg::new(config.ffmpeg.clone())),
        config.pipeline_settings(),
    )
    .with_interrupt(interrupted);

    let report = pipeline
        .run(&args.identifier, &files, args.merge_instruction())
        .await
        .with_context(|| format!("download of '{}' failed", args.identifier))?;

    if let Some(error) = &report.concat_error {
        warn!(%error, "some part sets were not merged");
    }
    info!(
        downloaded = report.downloaded_files.len(),
        skipped = report.skipped_files.len(),
        state = ?report.state,
        "download complete"
    );

    super::print_json(&report)
}
