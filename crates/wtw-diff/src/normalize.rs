use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::{Hunk, PatchSet};

/// Lines added on each side of a hunk to absorb numbering skew between the
/// diff and the baseline.
pub const DEFAULT_PADDING: u32 = 1;

/// Changed source lines per file, keyed by the path before the change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineChangeSet {
    files: IndexMap<PathBuf, BTreeSet<u32>>,
}

impl LineChangeSet {
    /// Collects the padded source span of every hunk.
    ///
    /// Files without hunks and files without a source side contribute
    /// nothing: there is no baseline numbering to match them against.
    #[must_use]
    pub fn from_patch(patch: &PatchSet, padding: u32) -> Self {
        let mut files: IndexMap<PathBuf, BTreeSet<u32>> = IndexMap::new();

        for file in &patch.files {
            let Some(source) = &file.source else {
                continue;
            };
            if file.hunks.is_empty() {
                continue;
            }

            let lines = files.entry(source.clone()).or_default();
            for hunk in &file.hunks {
                lines.extend(padded_span(hunk, padding));
            }
        }

        Self { files }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &BTreeSet<u32>)> {
        self.files.iter().map(|(path, lines)| (path.as_path(), lines))
    }

    #[must_use]
    pub fn lines(&self, path: &Path) -> Option<&BTreeSet<u32>> {
        self.files.get(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of changed lines across all files.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.files.values().map(BTreeSet::len).sum()
    }
}

/// Source lines a hunk spans, widened by `padding` on both ends.
///
/// For `@@ -S,L` this is `[S - padding, S + L - 1 + padding]`, clamped at
/// zero. A pure insertion (`L == 0`) still yields `S`.
#[must_use]
pub fn padded_span(hunk: &Hunk, padding: u32) -> RangeInclusive<u32> {
    let start = hunk.source_start.saturating_sub(padding);
    let end = (u64::from(hunk.source_start) + u64::from(hunk.source_length) + u64::from(padding))
        .saturating_sub(1)
        .max(u64::from(hunk.source_start));

    start..=u32::try_from(end).unwrap_or(u32::MAX)
}
