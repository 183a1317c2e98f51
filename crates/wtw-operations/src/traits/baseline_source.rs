use wtw_diff::LineChangeSet;

use crate::Result;

/// A recorded coverage baseline that maps changed lines to contexts.
pub trait BaselineSource {
    /// Returns the raw contexts (`<node-id>|<phase>`) that executed any of
    /// the changed lines. The empty context is never included.
    ///
    /// # Errors
    ///
    /// Returns an error if the baseline cannot be staged or queried.
    fn resolve_contexts(&mut self, changes: &LineChangeSet) -> Result<Vec<String>>;
}
