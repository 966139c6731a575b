//! Config command handler: show effective configuration.

use anyhow::Result;
use audiofetch_core::Config;
use serde_json::json;

pub fn run_config_show_command(config: &Config) -> Result<()> {
    let formats: Vec<&str> = config.formats.iter().map(|format| format.as_str()).collect();
    let effective = json!({
        "base_url": config.base_url,
        "download_dir": config.download_dir.display().to_string(),
        "formats": formats,
        "max_results": config.max_results,
        "ffmpeg": config.ffmpeg.display().to_string(),
        "ask_threshold": config.ask_threshold,
        "api_key": if config.api_key().is_some() { "set" } else { "unset" },
    });

    super::print_json(&effective)
}
