use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

/// Highest source line a parsed hunk may reach. Changed lines are staged as
/// bit masks, so the mask for line `n` is `n / 8` bytes long.
pub const MAX_LINE_NUMBER: u32 = 10_000_000;

/// Declared extent of one hunk, as written in its `@@ -S,L +T,M @@` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hunk {
    pub source_start: u32,
    pub source_length: u32,
    pub target_start: u32,
    pub target_length: u32,
}

impl Hunk {
    #[must_use]
    pub fn new(source_start: u32, source_length: u32, target_start: u32, target_length: u32) -> Self {
        Self {
            source_start,
            source_length,
            target_start,
            target_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path before the change; `None` for added files.
    pub source: Option<PathBuf>,
    /// Path after the change; `None` for deleted files.
    pub target: Option<PathBuf>,
    pub status: FileStatus,
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    #[must_use]
    pub fn new(source: Option<PathBuf>, target: Option<PathBuf>, status: FileStatus) -> Self {
        Self {
            source,
            target,
            status,
            hunks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_hunks(mut self, hunks: Vec<Hunk>) -> Self {
        self.hunks = hunks;
        self
    }

    /// The path the file has after the change, or before it if it was deleted.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.target.as_deref().or(self.source.as_deref())
    }

    /// Every path this entry touches: both sides of a rename, one otherwise.
    /// The origin of a copy is left untouched and is not reported.
    pub fn touched_paths(&self) -> impl Iterator<Item = &Path> {
        let source = self
            .source
            .as_deref()
            .filter(|_| self.status != FileStatus::Copied)
            .filter(|source| self.target.as_deref() != Some(*source));
        self.target.as_deref().into_iter().chain(source)
    }

    /// Re-expresses both sides relative to `dir`. A side outside `dir` is
    /// dropped; `None` if neither side is inside.
    fn relative_to(mut self, dir: &Path) -> Option<Self> {
        let strip = |path: Option<PathBuf>| {
            path.and_then(|path| path.strip_prefix(dir).ok().map(Path::to_path_buf))
        };
        self.source = strip(self.source);
        self.target = strip(self.target);
        (self.source.is_some() || self.target.is_some()).then_some(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
    pub files: Vec<FileDiff>,
}

impl PatchSet {
    #[must_use]
    pub fn new(files: Vec<FileDiff>) -> Self {
        Self { files }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Keeps the entries under `dir` with their paths made relative to it.
    #[must_use]
    pub fn within(self, dir: &Path) -> Self {
        if dir.as_os_str().is_empty() {
            return self;
        }
        let files = self
            .files
            .into_iter()
            .filter_map(|file| file.relative_to(dir))
            .collect();
        Self { files }
    }

    /// Paths of every file in the patch, in patch order, without duplicates.
    #[must_use]
    pub fn changed_files(&self) -> Vec<PathBuf> {
        let mut seen = indexmap::IndexSet::new();
        for file in &self.files {
            for path in file.touched_paths() {
                seen.insert(path.to_path_buf());
            }
        }
        seen.into_iter().collect()
    }
}
