use std::path::PathBuf;

use tracing::debug;

use crate::{DiffError, FileDiff, FileStatus, Hunk, PatchSet, Result};

use super::Repository;

impl Repository {
    /// Builds a [`PatchSet`] between `base` and `head`, or between `base` and
    /// the working tree (index included) when `head` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::RefNotFound`] if either reference cannot be resolved,
    /// or [`DiffError::Git`] if libgit2 fails to produce the diff.
    pub fn diff_patch(&self, base: &str, head: Option<&str>) -> Result<PatchSet> {
        let base_tree = self.resolve_tree(base)?;

        let mut diff = match head {
            Some(refspec) => {
                let head_tree = self.resolve_tree(refspec)?;
                self.inner
                    .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)?
            }
            None => self
                .inner
                .diff_tree_to_workdir_with_index(Some(&base_tree), None)?,
        };

        let mut find_opts = git2::DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        let mut files = Vec::new();

        for (index, delta) in diff.deltas().enumerate() {
            let status = match delta.status() {
                git2::Delta::Added | git2::Delta::Untracked => FileStatus::Added,
                git2::Delta::Deleted => FileStatus::Deleted,
                git2::Delta::Modified => FileStatus::Modified,
                git2::Delta::Renamed => FileStatus::Renamed,
                git2::Delta::Copied => FileStatus::Copied,
                _ => continue,
            };

            // libgit2 fills in both sides even when one does not exist.
            let source = match status {
                FileStatus::Added => None,
                _ => delta.old_file().path().map(PathBuf::from),
            };
            let target = match status {
                FileStatus::Deleted => None,
                _ => delta.new_file().path().map(PathBuf::from),
            };
            if source.is_none() && target.is_none() {
                return Err(DiffError::MissingDeltaPath);
            }

            let hunks = match git2::Patch::from_diff(&diff, index)? {
                Some(patch) => (0..patch.num_hunks())
                    .map(|hunk_index| {
                        patch.hunk(hunk_index).map(|(hunk, _)| {
                            Hunk::new(
                                hunk.old_start(),
                                hunk.old_lines(),
                                hunk.new_start(),
                                hunk.new_lines(),
                            )
                        })
                    })
                    .collect::<std::result::Result<Vec<_>, git2::Error>>()?,
                None => Vec::new(),
            };

            files.push(FileDiff::new(source, target, status).with_hunks(hunks));
        }

        debug!(
            base,
            head = head.unwrap_or("<worktree>"),
            files = files.len(),
            "built patch from repository"
        );

        Ok(PatchSet::new(files))
    }

    fn resolve_tree(&self, refspec: &str) -> Result<git2::Tree<'_>> {
        let obj = self
            .inner
            .revparse_single(refspec)
            .map_err(|_| DiffError::RefNotFound {
                refspec: refspec.to_string(),
            })?;

        obj.peel_to_tree().map_err(|_| DiffError::RefNotFound {
            refspec: refspec.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::setup_test_repo;
    use crate::{DiffError, FileStatus, Hunk};
    use std::fs;
    use std::path::{Path, PathBuf};

    fn commit_all(repo: &super::Repository, message: &str) -> anyhow::Result<()> {
        let mut index = repo.inner.index()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let sig = git2::Signature::now("Test", "test@example.com")?;
        let tree_id = index.write_tree()?;
        let tree = repo.inner.find_tree(tree_id)?;
        let parent = repo.inner.head()?.peel_to_commit()?;
        repo.inner
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;
        Ok(())
    }

    fn numbered_lines(count: u32) -> String {
        (1..=count).map(|n| format!("line {n}\n")).collect()
    }

    #[test]
    fn modified_file_reports_source_hunks() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        fs::write(dir.path().join("a.py"), numbered_lines(20))?;
        commit_all(&repo, "Add a.py")?;

        let changed = numbered_lines(20).replace("line 10\n", "line ten\n");
        fs::write(dir.path().join("a.py"), changed)?;
        commit_all(&repo, "Modify a.py")?;

        let patch = repo.diff_patch("HEAD~1", Some("HEAD"))?;

        assert_eq!(patch.files.len(), 1);
        let file = &patch.files[0];
        assert_eq!(file.status, FileStatus::Modified);
        assert_eq!(file.source.as_deref(), Some(Path::new("a.py")));
        assert_eq!(file.hunks, vec![Hunk::new(7, 7, 7, 7)]);

        Ok(())
    }

    #[test]
    fn added_file_has_no_source_side() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        fs::write(dir.path().join("new.py"), "x = 1\n")?;
        commit_all(&repo, "Add new.py")?;

        let patch = repo.diff_patch("HEAD~1", Some("HEAD"))?;

        assert_eq!(patch.files.len(), 1);
        assert_eq!(patch.files[0].status, FileStatus::Added);
        assert_eq!(patch.files[0].source, None);
        assert_eq!(patch.files[0].target, Some(PathBuf::from("new.py")));

        Ok(())
    }

    #[test]
    fn deleted_file_has_no_target_side() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        fs::write(dir.path().join("gone.py"), "x = 1\n")?;
        commit_all(&repo, "Add gone.py")?;
        fs::remove_file(dir.path().join("gone.py"))?;
        commit_all(&repo, "Delete gone.py")?;

        let patch = repo.diff_patch("HEAD~1", Some("HEAD"))?;

        assert_eq!(patch.files[0].status, FileStatus::Deleted);
        assert_eq!(patch.files[0].target, None);
        assert_eq!(patch.files[0].hunks, vec![Hunk::new(1, 1, 0, 0)]);

        Ok(())
    }

    #[test]
    fn working_tree_changes_are_diffed_without_head() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;

        fs::write(dir.path().join("a.py"), numbered_lines(3))?;
        commit_all(&repo, "Add a.py")?;
        fs::write(dir.path().join("a.py"), "line 1\nline two\nline 3\n")?;

        let patch = repo.diff_patch("HEAD", None)?;

        assert_eq!(patch.files.len(), 1);
        assert_eq!(patch.files[0].hunks, vec![Hunk::new(1, 3, 1, 3)]);

        Ok(())
    }

    #[test]
    fn unknown_base_is_ref_not_found() -> anyhow::Result<()> {
        let (_dir, repo) = setup_test_repo()?;

        let result = repo.diff_patch("nonexistent-ref", None);

        assert!(matches!(result, Err(DiffError::RefNotFound { .. })));
        Ok(())
    }
}
