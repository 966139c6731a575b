//! Download, dedup and concatenation pipeline for one remote item.
//!
//! One [`Pipeline::run`] call processes one item's file list, sequentially:
//!
//! 1. For each preferred format (outer loop) and each remote file matching
//!    it (inner loop), skip the file when its local copy matches the
//!    published hash, otherwise fetch it. A file matching several preferred
//!    formats is processed once per match.
//! 2. Group the files now present locally (fetched or skipped) into
//!    [`PartSet`]s, so parts fetched by an earlier invocation can be merged
//!    once the caller confirms.
//! 3. Merge the sets now, or report them for confirmation, per
//!    [`decide`].
//!
//! Merging stops at the first failed set: sets merged before it stay merged
//! (their parts deleted), the failed set and every later one keep their
//! parts on disk.
//!
//! Invocations sharing a destination directory must not run concurrently.
//! Each item gets its own subdirectory of the download root.

mod decision;
mod error;
mod report;

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, instrument, warn};

pub use decision::{DEFAULT_ASK_THRESHOLD, MergeDecision, MergeInstruction, decide};
pub use error::PipelineError;
pub use report::{DownloadReport, MergeResult, SetMergeResult, merged_suggestion, report_suggestion};

use crate::concat::{ConcatError, MergeTool};
use crate::fetch::{DownloadOutcome, Fetcher, FileSource, RemoteFileDescriptor};
use crate::format::{self, DEFAULT_FORMAT_PREFERENCE, LogicalAudioFormat};
use crate::multipart::{self, PartSet};

/// Settings a pipeline is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Preferred formats, highest priority first.
    pub formats: Vec<LogicalAudioFormat>,
    /// Root directory; each item is written to `<root>/<identifier>`.
    pub download_root: PathBuf,
    /// Set size at which automatic merging asks for confirmation.
    pub ask_threshold: usize,
}

impl PipelineSettings {
    /// Settings with default formats and threshold.
    pub fn new(download_root: impl Into<PathBuf>) -> Self {
        Self {
            formats: DEFAULT_FORMAT_PREFERENCE.to_vec(),
            download_root: download_root.into(),
            ask_threshold: DEFAULT_ASK_THRESHOLD,
        }
    }
}

/// Outcome of the fetch step.
#[derive(Debug, Default)]
struct FetchStep {
    /// Every file present after the step, in processing order, once each.
    present: Vec<String>,
    seen: HashSet<String>,
    downloaded: Vec<String>,
    skipped: Vec<String>,
}

impl FetchStep {
    fn record(&mut self, name: &str, transferred: bool) {
        if transferred {
            self.downloaded.push(name.to_string());
        } else {
            self.skipped.push(name.to_string());
        }
        if self.seen.insert(name.to_string()) {
            self.present.push(name.to_string());
        }
    }
}

/// Outcome of the merge step.
#[derive(Debug, Default)]
struct MergeRun {
    results: Vec<SetMergeResult>,
    merged: Vec<usize>,
    error: Option<String>,
}

/// Runs the fetch, detect and merge steps for remote items.
pub struct Pipeline {
    fetcher: Fetcher,
    merge_tool: Arc<dyn MergeTool>,
    settings: PipelineSettings,
    interrupt: Arc<AtomicBool>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline over a transport and a merge tool.
    #[must_use]
    pub fn new(
        source: Arc<dyn FileSource>,
        merge_tool: Arc<dyn MergeTool>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            fetcher: Fetcher::new(source),
            merge_tool,
            settings,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Uses `flag` as the cancellation signal.
    ///
    /// The flag is checked between fetches and between merges; a transfer
    /// or merge already running is allowed to finish.
    #[must_use]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = flag;
        self
    }

    /// The settings in use.
    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Directory the given item is written to.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidIdentifier`] if the identifier is not
    /// a single plain path component.
    pub fn item_dir(&self, item_id: &str) -> Result<PathBuf, PipelineError> {
        let mut components = Path::new(item_id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.settings.download_root.join(item_id)),
            _ => Err(PipelineError::InvalidIdentifier {
                identifier: item_id.to_string(),
            }),
        }
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    /// Fetches, groups and (conditionally) merges one item's files.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Transport`] when a transfer fails
    /// - [`PipelineError::Io`] when a local filesystem operation fails
    /// - [`PipelineError::Interrupted`] when cancelled between fetches
    ///
    /// Merge failures and an unavailable merge tool are recorded in the
    /// report instead.
    #[instrument(skip(self, files), fields(item = %item_id, files = files.len()))]
    pub async fn run(
        &self,
        item_id: &str,
        files: &[RemoteFileDescriptor],
        instruction: MergeInstruction,
    ) -> Result<DownloadReport, PipelineError> {
        let dest_dir = self.item_dir(item_id)?;
        tokio::fs::create_dir_all(&dest_dir)
            .await
            .map_err(|e| PipelineError::io(&dest_dir, e))?;

        let fetched = self.download_all(item_id, files, &dest_dir).await?;
        info!(
            downloaded = fetched.downloaded.len(),
            skipped = fetched.skipped.len(),
            "fetch step complete"
        );

        let sets = multipart::detect(fetched.present.as_slice());
        let mut report = DownloadReport::new(
            item_id,
            dest_dir.clone(),
            fetched.present,
            fetched.downloaded,
            fetched.skipped,
        );
        let decision = decide(&sets, instruction, self.settings.ask_threshold);
        debug!(?decision, ?instruction, sets = sets.len(), "merge decision");
        report.state = decision;

        match decision {
            MergeDecision::NoSets => return Ok(report),
            MergeDecision::Reported => {
                report.suggestion = Some(report_suggestion(sets.len()));
                report.merge_results = decline_all(&sets, "awaiting confirmation");
            }
            MergeDecision::Merged => {
                let run = self.merge_all(&dest_dir, &sets).await;
                let merged_sets: Vec<&PartSet> = run.merged.iter().map(|&i| &sets[i]).collect();
                report.apply_merges(&merged_sets);
                report.concatenated_files = merged_sets
                    .iter()
                    .map(|set| set.output_name.clone())
                    .collect();
                report.suggestion = Some(merged_suggestion(run.merged.len(), sets.len()));
                report.merge_results = run.results;
                report.concat_error = run.error;
            }
        }

        report.multi_part_detected = true;
        report.multi_part_sets = sets;
        Ok(report)
    }

    /// Fetch step: preference order outer, file list inner.
    async fn download_all(
        &self,
        item_id: &str,
        files: &[RemoteFileDescriptor],
        dest_dir: &Path,
    ) -> Result<FetchStep, PipelineError> {
        let mut step = FetchStep::default();

        for &wanted in &self.settings.formats {
            for file in files
                .iter()
                .filter(|file| format::matches(&file.format_label, wanted))
            {
                if self.interrupted() {
                    return Err(PipelineError::Interrupted {
                        completed: step.downloaded.len() + step.skipped.len(),
                    });
                }

                let dest_path = local_path(dest_dir, &file.name)?;
                if let Some(parent) = dest_path.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| PipelineError::io(parent, e))?;
                }

                debug!(file = %file.name, format = %wanted, "materializing");
                match self.fetcher.materialize(item_id, file, &dest_path).await {
                    DownloadOutcome::Downloaded { .. } => step.record(&file.name, true),
                    DownloadOutcome::Skipped(_) => step.record(&file.name, false),
                    DownloadOutcome::Failed(e) => return Err(e.into()),
                }
            }
        }

        Ok(step)
    }

    /// Merge step. Stops at the first failure.
    async fn merge_all(&self, dest_dir: &Path, sets: &[PartSet]) -> MergeRun {
        let mut run = MergeRun::default();

        if let Err(e) = self.merge_tool.check_available().await {
            warn!(error = %e, "merge tool unavailable, leaving parts in place");
            run.error = Some(e.to_string());
            run.results = decline_all(sets, "merge tool unavailable");
            return run;
        }

        for (index, set) in sets.iter().enumerate() {
            if self.interrupted() {
                warn!(set = %set.output_name, "interrupted before merge");
                run.error = Some(format!("merging interrupted before {}", set.output_name));
                run.results.extend(decline_all(&sets[index..], "interrupted"));
                break;
            }

            let inputs: Vec<PathBuf> = set.files.iter().map(|file| dest_dir.join(file)).collect();
            let output = dest_dir.join(&set.output_name);

            let merged = if occupied_by_other_file(&output, &inputs).await {
                Err(ConcatError::OutputExists {
                    output: output.clone(),
                })
            } else {
                self.merge_tool.concatenate(&inputs, &output).await
            };

            match merged {
                Ok(()) => {
                    for input in &inputs {
                        if input != &output {
                            let _ = tokio::fs::remove_file(input).await;
                        }
                    }
                    info!(output = %set.output_name, parts = set.files.len(), "merged part set");
                    run.merged.push(index);
                    run.results.push(SetMergeResult {
                        set: set.output_name.clone(),
                        result: MergeResult::Merged {
                            output_name: set.output_name.clone(),
                        },
                    });
                }
                Err(e) => {
                    warn!(output = %set.output_name, error = %e, "merge failed, stopping");
                    run.error = Some(format!("Failed to concatenate {}: {e}", set.output_name));
                    run.results.push(SetMergeResult {
                        set: set.output_name.clone(),
                        result: MergeResult::Failed {
                            error: e.to_string(),
                        },
                    });
                    run.results.extend(decline_all(
                        &sets[index + 1..],
                        "not attempted after an earlier merge failed",
                    ));
                    break;
                }
            }
        }

        run
    }
}

/// True when `output` exists and is not one of the set's own parts.
async fn occupied_by_other_file(output: &Path, inputs: &[PathBuf]) -> bool {
    if inputs.iter().any(|input| input == output) {
        return false;
    }
    tokio::fs::symlink_metadata(output).await.is_ok()
}

fn decline_all(sets: &[PartSet], reason: &str) -> Vec<SetMergeResult> {
    sets.iter()
        .map(|set| SetMergeResult {
            set: set.output_name.clone(),
            result: MergeResult::Declined {
                reason: reason.to_string(),
            },
        })
        .collect()
}

/// Joins a remote file name onto the item directory.
///
/// Names may contain subdirectories but must stay inside `dest_dir`.
fn local_path(dest_dir: &Path, name: &str) -> Result<PathBuf, PipelineError> {
    let relative = Path::new(name);
    let plain = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if name.is_empty() || !plain {
        return Err(PipelineError::UnsafeFileName {
            file: name.to_string(),
        });
    }
    Ok(dest_dir.join(relative))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_rejects_traversal() {
        let dir = Path::new("/dl/item");
        assert!(local_path(dir, "../escape.mp3").is_err());
        assert!(local_path(dir, "/etc/passwd").is_err());
        assert!(local_path(dir, "").is_err());
        assert_eq!(
            local_path(dir, "disc1/track_1.mp3").unwrap(),
            PathBuf::from("/dl/item/disc1/track_1.mp3")
        );
    }

    #[test]
    fn test_settings_defaults() {
        let settings = PipelineSettings::new("/dl");
        assert_eq!(settings.ask_threshold, 5);
        assert_eq!(settings.formats, DEFAULT_FORMAT_PREFERENCE.to_vec());
    }
}
