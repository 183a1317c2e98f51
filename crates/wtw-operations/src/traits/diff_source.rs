use wtw_diff::PatchSet;

use crate::Result;

/// Where the change under test comes from.
pub trait DiffSource {
    /// # Errors
    ///
    /// Returns an error if the diff cannot be read or is malformed.
    fn load_patch(&self) -> Result<PatchSet>;
}

impl<T: DiffSource + ?Sized> DiffSource for Box<T> {
    fn load_patch(&self) -> Result<PatchSet> {
        (**self).load_patch()
    }
}
