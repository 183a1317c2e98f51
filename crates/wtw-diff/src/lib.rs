mod error;
mod normalize;
mod parse;
mod repository;
mod types;

pub use error::DiffError;
pub use normalize::{DEFAULT_PADDING, LineChangeSet, padded_span};
pub use parse::parse_patch;
pub use repository::Repository;
pub use types::{FileDiff, FileStatus, Hunk, MAX_LINE_NUMBER, PatchSet};

use std::path::Path;

pub type Result<T> = std::result::Result<T, DiffError>;

/// Diffs the repository enclosing `path`, keeping only the files under `path`
/// with their paths made relative to it.
///
/// # Errors
///
/// Returns an error if the path is not inside a git work tree or a reference
/// cannot be resolved.
pub fn diff_from_git(path: &Path, base: &str, head: Option<&str>) -> Result<PatchSet> {
    let repo = Repository::open(path)?;
    let scope = repo.relative_to_root(path)?;
    Ok(repo.diff_patch(base, head)?.within(&scope))
}
