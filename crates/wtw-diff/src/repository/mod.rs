mod diff;

use std::path::{Path, PathBuf};

use crate::{DiffError, Result};

/// A git work tree that patches are built from. Paths in those patches are
/// relative to [`Repository::root`].
pub struct Repository {
    pub(crate) inner: git2::Repository,
    root: PathBuf,
}

impl Repository {
    /// Finds the repository enclosing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::NotARepository`] if no enclosing repository has a
    /// work tree.
    pub fn open(path: &Path) -> Result<Self> {
        let not_a_repository = || DiffError::NotARepository {
            path: path.to_path_buf(),
        };

        let inner = git2::Repository::discover(path).map_err(|_| not_a_repository())?;
        let workdir = inner.workdir().ok_or_else(not_a_repository)?;
        let root = dunce::canonicalize(workdir).map_err(|_| not_a_repository())?;

        Ok(Self { inner, root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `path` relative to the work tree root; empty for the root itself.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::OutsideWorkTree`] if `path` does not exist or lies
    /// outside the work tree.
    pub fn relative_to_root(&self, path: &Path) -> Result<PathBuf> {
        let outside = || DiffError::OutsideWorkTree {
            path: path.to_path_buf(),
            root: self.root.clone(),
        };

        let resolved = dunce::canonicalize(path).map_err(|_| outside())?;
        resolved
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .map_err(|_| outside())
    }
}
