use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use wtw_core::{ContextLabel, ImpactResult};
use wtw_diff::{DEFAULT_PADDING, LineChangeSet};

use crate::Result;
use crate::traits::{BaselineSource, DiffSource};

/// Maps a diff to the tests whose recorded coverage it touches.
///
/// The result is computed on the first call to [`ImpactResolver::resolve`]
/// and reused afterwards; neither source is consulted again.
pub struct ImpactResolver<D, B> {
    root: PathBuf,
    padding: u32,
    diff_source: D,
    baseline: B,
    cached: Option<ImpactResult>,
}

impl<D, B> ImpactResolver<D, B>
where
    D: DiffSource,
    B: BaselineSource,
{
    pub fn new(root: PathBuf, diff_source: D, baseline: B) -> Self {
        Self {
            root,
            padding: DEFAULT_PADDING,
            diff_source,
            baseline,
            cached: None,
        }
    }

    #[must_use]
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// # Errors
    ///
    /// Returns an error if the diff cannot be loaded or the baseline query
    /// fails. Nothing is cached on failure.
    pub fn resolve(&mut self) -> Result<&ImpactResult> {
        let result = match self.cached.take() {
            Some(result) => result,
            None => self.compute()?,
        };
        Ok(self.cached.insert(result))
    }

    fn compute(&mut self) -> Result<ImpactResult> {
        let patch = self.diff_source.load_patch()?;
        let changes = LineChangeSet::from_patch(&patch, self.padding);
        debug!(
            files = patch.files.len(),
            staged_files = changes.len(),
            lines = changes.line_count(),
            padding = self.padding,
            "normalized diff"
        );

        let files_changed = patch
            .changed_files()
            .into_iter()
            .map(|path| self.root.join(path))
            .collect();

        let mut context_files = BTreeSet::new();
        let mut contexts = BTreeSet::new();
        for raw in self.baseline.resolve_contexts(&changes)? {
            let Some(label) = ContextLabel::parse(&raw) else {
                continue;
            };
            context_files.insert(self.root.join(label.file_part()));
            contexts.insert(label.node_id);
        }

        let result = ImpactResult {
            files_changed,
            context_files,
            contexts,
        };

        info!(
            files_changed = result.files_changed.len(),
            context_files = result.context_files.len(),
            contexts = result.contexts.len(),
            "resolved impact"
        );

        Ok(result)
    }
}
