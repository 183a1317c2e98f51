use std::path::Path;

use wtw_baseline::BaselineStore;
use wtw_diff::LineChangeSet;

use crate::Result;
use crate::traits::BaselineSource;

/// A coverage database on disk.
pub struct SqliteBaseline {
    store: BaselineStore,
    prefix_override: Option<String>,
}

impl SqliteBaseline {
    /// Opens the baseline up front so a bad path fails before any diff work.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or lacks the
    /// coverage tables.
    pub fn open(path: &Path, prefix_override: Option<String>) -> Result<Self> {
        Ok(Self {
            store: BaselineStore::open(path)?,
            prefix_override,
        })
    }
}

impl BaselineSource for SqliteBaseline {
    fn resolve_contexts(&mut self, changes: &LineChangeSet) -> Result<Vec<String>> {
        let resolution = self
            .store
            .resolve(changes, self.prefix_override.as_deref())?;
        Ok(resolution.contexts)
    }
}
