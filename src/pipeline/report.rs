//! Result of one pipeline invocation, serialized as JSON for the caller.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;

use super::decision::MergeDecision;
use crate::multipart::PartSet;

/// What happened to one part set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MergeResult {
    /// Merged into `output_name`; the parts were removed.
    Merged {
        /// Merged file name.
        output_name: String,
    },
    /// Not merged; parts left in place.
    Declined {
        /// Why the set was left alone.
        reason: String,
    },
    /// The merge tool failed on this set; parts left in place.
    Failed {
        /// Error detail.
        error: String,
    },
}

/// [`MergeResult`] tagged with the set it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetMergeResult {
    /// The set's output name, which identifies it.
    pub set: String,
    /// Outcome for the set.
    #[serde(flatten)]
    pub result: MergeResult,
}

/// Final report of a pipeline invocation.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    /// Remote item identifier.
    pub identifier: String,
    /// Directory the item was written to.
    pub download_dir: PathBuf,
    /// Surviving local inventory of matching files: everything fetched or
    /// skipped, with merged outputs in place of their parts.
    pub local_files: Vec<String>,
    /// Files transferred in this invocation.
    pub downloaded_files: Vec<String>,
    /// Files whose local copy already matched.
    pub skipped_files: Vec<String>,
    /// Terminal state of the merge step. `merged` means a merge pass ran;
    /// `merge_results` and `concat_error` tell which sets it completed.
    pub state: MergeDecision,
    /// True whenever part sets were found.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multi_part_detected: bool,
    /// Detected part sets.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub multi_part_sets: Vec<PartSet>,
    /// Human-readable next step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Per-set outcomes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub merge_results: Vec<SetMergeResult>,
    /// Output names of sets merged in this invocation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub concatenated_files: Vec<String>,
    /// Why merging stopped, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concat_error: Option<String>,
}

impl DownloadReport {
    /// Report for an invocation that found no part sets.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        download_dir: PathBuf,
        local_files: Vec<String>,
        downloaded_files: Vec<String>,
        skipped_files: Vec<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            download_dir,
            local_files,
            downloaded_files,
            skipped_files,
            state: MergeDecision::NoSets,
            multi_part_detected: false,
            multi_part_sets: Vec::new(),
            suggestion: None,
            merge_results: Vec::new(),
            concatenated_files: Vec::new(),
            concat_error: None,
        }
    }

    /// Replaces merged parts in `local_files` with their outputs.
    ///
    /// Each output takes the position of the first of its parts; files that
    /// were not merged keep their place.
    pub(crate) fn apply_merges(&mut self, merged: &[&PartSet]) {
        let owner: HashMap<&str, &str> = merged
            .iter()
            .flat_map(|set| {
                set.files
                    .iter()
                    .map(|file| (file.as_str(), set.output_name.as_str()))
            })
            .collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut inventory = Vec::with_capacity(self.local_files.len());
        for name in &self.local_files {
            let entry = owner.get(name.as_str()).copied().unwrap_or(name.as_str());
            if seen.insert(entry.to_string()) {
                inventory.push(entry.to_string());
            }
        }
        self.local_files = inventory;
    }
}

/// Suggestion shown when sets are reported instead of merged.
#[must_use]
pub fn report_suggestion(set_count: usize) -> String {
    format!(
        "Found {set_count} multi-part file set(s). Re-run with --concat to concatenate them using ffmpeg."
    )
}

/// Suggestion shown after a merge pass.
#[must_use]
pub fn merged_suggestion(merged: usize, set_count: usize) -> String {
    if merged == set_count {
        format!("Concatenated {merged} multi-part file set(s).")
    } else {
        format!(
            "Concatenated {merged} of {set_count} multi-part file set(s); the remaining parts are still on disk."
        )
    }
}
