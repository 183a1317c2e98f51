use std::path::PathBuf;

use wtw_diff::{PatchSet, diff_from_git, parse_patch};

use crate::Result;
use crate::error::OperationError;
use crate::traits::DiffSource;

/// Reads a unified diff from a file.
pub struct FileDiffSource {
    path: PathBuf,
}

impl FileDiffSource {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DiffSource for FileDiffSource {
    fn load_patch(&self) -> Result<PatchSet> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| {
            OperationError::DiffRead {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(parse_patch(&text)?)
    }
}

/// Diffs a git repository between `base` and `head`, or between `base` and
/// the working tree when no head is given. Only files under `root` are kept,
/// with paths relative to it, so `root` may be a subdirectory of the work tree.
pub struct GitDiffSource {
    root: PathBuf,
    base: String,
    head: Option<String>,
}

impl GitDiffSource {
    #[must_use]
    pub fn new(root: PathBuf, base: String, head: Option<String>) -> Self {
        Self { root, base, head }
    }
}

impl DiffSource for GitDiffSource {
    fn load_patch(&self) -> Result<PatchSet> {
        Ok(diff_from_git(
            &self.root,
            &self.base,
            self.head.as_deref(),
        )?)
    }
}
