//! Detection of files the archive split into numbered parts.
//!
//! Names are matched against an ordered list of part-indicator patterns.
//! The first pattern that matches a name wins; the matched span is cut out
//! to form the base pattern, and files sharing `base pattern + extension`
//! form one [`PartSet`].
//!
//! # Ordering
//!
//! Files inside a set are sorted lexicographically, so a ten-part set
//! merges as `x_1, x_10, x_2, ...`. This is the merge order existing
//! downloads were produced with and must be kept.
//!
//! Sets are returned in the order their grouping key was first seen in the
//! input list.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Part-indicator patterns in priority order.
#[allow(clippy::expect_used)]
static PART_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"[_-]Part[_-][0-9]+").expect("part pattern is valid"),
        Regex::new(r"[_-]part[_-][0-9]+").expect("part pattern is valid"),
        Regex::new(r"[_-][0-9]+$").expect("part pattern is valid"),
        Regex::new(r"\([0-9]+\)").expect("part pattern is valid"),
    ]
});

/// A group of files that are sequential fragments of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSet {
    /// Base name with the part indicator removed.
    pub base_pattern: String,
    /// Member file names in merge order (lexicographic). Always two or more.
    pub files: Vec<String>,
    /// Name of the merged file: base pattern plus the members' extension.
    pub output_name: String,
}

impl PartSet {
    /// Number of parts in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always false for sets produced by [`detect`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Splits `name` into stem and extension (with leading dot).
///
/// The extension starts at the last `.` of the final path component; names
/// without one get an empty extension.
#[must_use]
pub fn split_extension(name: &str) -> (&str, &str) {
    let component_start = name.rfind('/').map_or(0, |idx| idx + 1);
    match name[component_start..].rfind('.') {
        Some(dot) => name.split_at(component_start + dot),
        None => (name, ""),
    }
}

/// Returns the base pattern for `stem` under the first matching part pattern.
fn strip_part_indicator(stem: &str) -> Option<String> {
    PART_PATTERNS.iter().find_map(|pattern| {
        pattern
            .is_match(stem)
            .then(|| pattern.replace_all(stem, "").into_owned())
    })
}

/// Groups `file_names` into multi-part sets.
///
/// Names with no part indicator, and groups with a single member, are left
/// out. An input without multi-part files yields an empty vector.
#[must_use]
pub fn detect<S: AsRef<str>>(file_names: &[S]) -> Vec<PartSet> {
    let mut groups: IndexMap<String, PartSet> = IndexMap::new();

    for name in file_names {
        let name = name.as_ref();
        let (stem, extension) = split_extension(name);
        let Some(base_pattern) = strip_part_indicator(stem) else {
            trace!(file = %name, "no part indicator");
            continue;
        };

        let key = format!("{base_pattern}{extension}");
        groups
            .entry(key.clone())
            .or_insert_with(|| PartSet {
                base_pattern,
                files: Vec::new(),
                output_name: key,
            })
            .files
            .push(name.to_string());
    }

    let sets: Vec<PartSet> = groups
        .into_values()
        .filter(|set| set.files.len() > 1)
        .map(|mut set| {
            set.files.sort();
            set
        })
        .collect();

    debug!(inputs = file_names.len(), sets = sets.len(), "multi-part detection");
    sets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_part_set_excludes_unrelated_file() {
        let sets = detect(&["Show_Part_1.mp3", "Show_Part_2.mp3", "Intro.mp3"]);

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].files, vec!["Show_Part_1.mp3", "Show_Part_2.mp3"]);
        assert_eq!(sets[0].output_name, "Show.mp3");
        assert_eq!(sets[0].base_pattern, "Show");
    }

    #[test]
    fn test_detect_sorts_lexicographically_not_numerically() {
        let sets = detect(&["a_1.mp3", "a_2.mp3", "a_10.mp3"]);

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].files, vec!["a_1.mp3", "a_10.mp3", "a_2.mp3"]);
        assert_eq!(sets[0].output_name, "a.mp3");
    }

    #[test]
    fn test_detect_without_parts_is_empty() {
        assert!(detect(&["Intro.mp3", "Outro.flac", "cover.jpg"]).is_empty());
        assert!(detect::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_detect_drops_singletons() {
        assert!(detect(&["Show_Part_1.mp3", "Other_2.mp3"]).is_empty());
    }

    #[test]
    fn test_detect_lowercase_part_and_dash_separator() {
        let sets = detect(&["tape-part-2.flac", "tape-part-1.flac"]);

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].files, vec!["tape-part-1.flac", "tape-part-2.flac"]);
        assert_eq!(sets[0].output_name, "tape.flac");
    }

    #[test]
    fn test_detect_parenthesized_number() {
        let sets = detect(&["Lecture (1).ogg", "Lecture (2).ogg"]);

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].base_pattern, "Lecture ");
        assert_eq!(sets[0].output_name, "Lecture .ogg");
    }

    #[test]
    fn test_detect_first_pattern_wins() {
        // "_Part_1" matches before the trailing "_7" pattern is considered.
        let sets = detect(&["Show_Part_1_7.mp3", "Show_Part_2_7.mp3"]);

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].output_name, "Show_7.mp3");
    }

    #[test]
    fn test_detect_groups_by_extension() {
        let sets = detect(&["s_1.mp3", "s_2.mp3", "s_1.flac", "s_2.flac"]);

        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].output_name, "s.mp3");
        assert_eq!(sets[1].output_name, "s.flac");
    }

    #[test]
    fn test_detect_order_follows_first_appearance() {
        let sets = detect(&["b_1.mp3", "a_1.mp3", "a_2.mp3", "b_2.mp3"]);

        let outputs: Vec<&str> = sets.iter().map(|s| s.output_name.as_str()).collect();
        assert_eq!(outputs, vec!["b.mp3", "a.mp3"]);
    }

    #[test]
    fn test_detect_case_sensitive_part_keyword() {
        // "PART" matches neither keyword pattern; the trailing digits still group it.
        let sets = detect(&["x_PART_1.mp3", "x_PART_2.mp3"]);

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].base_pattern, "x_PART");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a_1.mp3"), ("a_1", ".mp3"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("noext_1"), ("noext_1", ""));
        assert_eq!(split_extension("dir.v2/track_1"), ("dir.v2/track_1", ""));
    }
}
