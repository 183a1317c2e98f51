use std::path::Path;

use tracing::debug;
use wtw_core::{ImpactResult, TestItem, node_file_part};

use crate::Result;
use crate::operations::ImpactResolver;
use crate::traits::{BaselineSource, DiffSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T> {
    pub selected: Vec<T>,
    pub deselected: Vec<T>,
}

/// Decides which test files to collect and which collected items to run.
///
/// An inactive filter passes everything through and reports nothing.
pub struct SelectionFilter<D, B> {
    resolver: Option<ImpactResolver<D, B>>,
    skipped_files: usize,
    status: Option<String>,
}

impl<D, B> SelectionFilter<D, B>
where
    D: DiffSource,
    B: BaselineSource,
{
    #[must_use]
    pub fn inactive() -> Self {
        Self {
            resolver: None,
            skipped_files: 0,
            status: None,
        }
    }

    #[must_use]
    pub fn active(resolver: ImpactResolver<D, B>) -> Self {
        Self {
            resolver: Some(resolver),
            skipped_files: 0,
            status: None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.resolver.is_some()
    }

    /// The resolved impact, or `None` when the filter is inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if impact resolution fails.
    pub fn impact(&mut self) -> Result<Option<&ImpactResult>> {
        match &mut self.resolver {
            Some(resolver) => resolver.resolve().map(Some),
            None => Ok(None),
        }
    }

    /// Whether a candidate test file can be left out of collection.
    ///
    /// Only regular files are ever skipped. Relative paths are taken
    /// relative to the project root.
    ///
    /// # Errors
    ///
    /// Returns an error if impact resolution fails.
    pub fn should_skip(&mut self, path: &Path) -> Result<bool> {
        let Some(resolver) = &mut self.resolver else {
            return Ok(false);
        };

        let path = resolver.root().join(path);
        if !path.is_file() {
            return Ok(false);
        }

        let skip = !resolver.resolve()?.touches_file(&path);
        if skip {
            self.skipped_files += 1;
            debug!(path = %path.display(), "skipping file");
        }
        Ok(skip)
    }

    /// Splits collected items into those to run and those to deselect,
    /// keeping their original order.
    ///
    /// An item is kept when its node id was recorded under a matching
    /// context, or when the file it lives in was itself changed.
    ///
    /// # Errors
    ///
    /// Returns an error if impact resolution fails.
    pub fn select<T: TestItem>(&mut self, items: Vec<T>) -> Result<Selection<T>> {
        let Some(resolver) = &mut self.resolver else {
            return Ok(Selection {
                selected: items,
                deselected: Vec::new(),
            });
        };

        let root = resolver.root().to_path_buf();
        let impact = resolver.resolve()?;

        let (selected, deselected): (Vec<T>, Vec<T>) = items.into_iter().partition(|item| {
            let node_id = item.node_id();
            impact.covers(node_id)
                || impact
                    .files_changed
                    .contains(&root.join(node_file_part(node_id)))
        });

        self.status = Some(status_line(
            selected.len(),
            deselected.len(),
            self.skipped_files,
        ));

        Ok(Selection {
            selected,
            deselected,
        })
    }

    /// The summary of the last [`SelectionFilter::select`], if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    #[must_use]
    pub fn skipped_files(&self) -> usize {
        self.skipped_files
    }
}

fn status_line(selected: usize, deselected: usize, skipped_files: usize) -> String {
    let noun = if selected == 1 { "test" } else { "tests" };
    let mut status = format!("{selected} {noun} cover the changed lines ({deselected} deselected)");
    if skipped_files > 0 {
        let noun = if skipped_files == 1 { "file" } else { "files" };
        status.push_str(&format!(" (skipped {skipped_files} {noun})"));
    }
    status
}
