//! Whether detected part sets are merged now or reported for confirmation.

use serde::Serialize;

use crate::multipart::PartSet;

/// Default ask-threshold: sets with this many parts need confirmation.
pub const DEFAULT_ASK_THRESHOLD: usize = 5;

/// Caller's instruction for this invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeInstruction {
    /// Decide from the ask-threshold.
    #[default]
    Auto,
    /// Merge every detected set.
    Merge,
    /// Only report the detected sets.
    DoNotMerge,
}

impl From<Option<bool>> for MergeInstruction {
    fn from(concat: Option<bool>) -> Self {
        match concat {
            None => Self::Auto,
            Some(true) => Self::Merge,
            Some(false) => Self::DoNotMerge,
        }
    }
}

/// Terminal state of the merge step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeDecision {
    /// Nothing to merge.
    NoSets,
    /// Sets are surfaced, nothing is merged.
    Reported,
    /// A merge pass ran. Individual sets may still have been declined or
    /// failed (tool unavailable, interruption, earlier failure); see the
    /// report's per-set results.
    Merged,
}

/// Decides what to do with `sets`.
///
/// With no explicit instruction, the first set (in detection order) whose
/// size reaches `ask_threshold` turns the whole batch into a report.
#[must_use]
pub fn decide(sets: &[PartSet], instruction: MergeInstruction, ask_threshold: usize) -> MergeDecision {
    if sets.is_empty() {
        return MergeDecision::NoSets;
    }
    match instruction {
        MergeInstruction::Merge => MergeDecision::Merged,
        MergeInstruction::DoNotMerge => MergeDecision::Reported,
        MergeInstruction::Auto => {
            if sets.iter().any(|set| set.files.len() >= ask_threshold) {
                MergeDecision::Reported
            } else {
                MergeDecision::Merged
            }
        }
    }
}
