use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("git operation failed")]
    Git(#[from] git2::Error),

    #[error("not a git repository: '{path}'")]
    NotARepository { path: PathBuf },

    #[error("failed to resolve reference '{refspec}'")]
    RefNotFound { refspec: String },

    #[error("diff delta has no file path")]
    MissingDeltaPath,

    #[error("line {line}: hunk header outside of a file entry")]
    HunkOutsideFile { line: usize },

    #[error("line {line}: malformed hunk header '{header}'")]
    MalformedHunkHeader { line: usize, header: String },

    #[error("line {line}: '---' header is not followed by a '+++' header")]
    MissingTargetHeader { line: usize },

    #[error(
        "line {line}: hunk ended early, {source_left} source and {target_left} target line(s) missing"
    )]
    TruncatedHunk {
        line: usize,
        source_left: u32,
        target_left: u32,
    },

    #[error("line {line}: hunk reaches source line {value}, beyond the supported maximum")]
    LineOutOfRange { line: usize, value: u32 },

    #[error("'{path}' is not inside the work tree '{root}'")]
    OutsideWorkTree { path: PathBuf, root: PathBuf },

    #[error("line {line}: hunk body has more lines than its header declares")]
    UnexpectedHunkLine { line: usize },
}

impl DiffError {
    /// True for errors caused by malformed diff text, as opposed to git failures.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::HunkOutsideFile { .. }
                | Self::MalformedHunkHeader { .. }
                | Self::MissingTargetHeader { .. }
                | Self::TruncatedHunk { .. }
                | Self::UnexpectedHunkLine { .. }
                | Self::LineOutOfRange { .. }
        )
    }
}
