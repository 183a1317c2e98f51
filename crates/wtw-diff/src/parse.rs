use std::iter::Enumerate;
use std::path::PathBuf;
use std::str::Lines;

use crate::{DiffError, FileDiff, FileStatus, Hunk, MAX_LINE_NUMBER, PatchSet, Result};

const DEV_NULL: &str = "/dev/null";

/// Parses a unified diff, git-style or traditional, into a [`PatchSet`].
///
/// Text before the first file entry and between entries (commit messages,
/// mail headers) is skipped. Hunk bodies are checked against the lengths in
/// their headers but their content is not kept.
///
/// # Errors
///
/// Returns a parse variant of [`DiffError`] if a hunk header is malformed or
/// appears outside a file entry, a `---` header has no matching `+++`, or a
/// hunk body does not match its declared lengths. Hunks reaching past
/// [`MAX_LINE_NUMBER`] are rejected.
pub fn parse_patch(text: &str) -> Result<PatchSet> {
    PatchParser::new(text).parse()
}

struct PatchParser<'a> {
    lines: Enumerate<Lines<'a>>,
    files: Vec<FileDiff>,
    // Set after `diff --git` until the entry's `---`/`+++` pair or first hunk.
    awaiting_headers: bool,
}

impl<'a> PatchParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            files: Vec::new(),
            awaiting_headers: false,
        }
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines.next().map(|(index, line)| (index + 1, line))
    }

    fn parse(mut self) -> Result<PatchSet> {
        while let Some((number, line)) = self.next_line() {
            if let Some(rest) = line.strip_prefix("diff --git ") {
                let (source, target) = split_git_paths(rest);
                self.files
                    .push(FileDiff::new(source, target, FileStatus::Modified));
                self.awaiting_headers = true;
            } else if let Some(source) = line.strip_prefix("--- ") {
                self.parse_file_headers(number, source)?;
            } else if line.starts_with("@@") {
                self.parse_hunk(number, line)?;
            } else if self.awaiting_headers {
                self.parse_extended_header(line);
            }
        }

        Ok(PatchSet::new(self.files))
    }

    fn parse_file_headers(&mut self, number: usize, source: &str) -> Result<()> {
        let target = self
            .next_line()
            .and_then(|(_, line)| line.strip_prefix("+++ "))
            .ok_or(DiffError::MissingTargetHeader { line: number })?;

        let source = header_path(source, "a/");
        let target = header_path(target, "b/");

        if self.awaiting_headers {
            if let Some(file) = self.files.last_mut() {
                file.source = source;
                file.target = target;
                if file.source.is_none() {
                    file.status = FileStatus::Added;
                } else if file.target.is_none() {
                    file.status = FileStatus::Deleted;
                }
            }
        } else {
            let status = match (&source, &target) {
                (None, _) => FileStatus::Added,
                (_, None) => FileStatus::Deleted,
                _ => FileStatus::Modified,
            };
            self.files.push(FileDiff::new(source, target, status));
        }

        self.awaiting_headers = false;
        Ok(())
    }

    fn parse_extended_header(&mut self, line: &str) {
        let Some(file) = self.files.last_mut() else {
            return;
        };

        if line.starts_with("new file mode") {
            file.status = FileStatus::Added;
            file.source = None;
        } else if line.starts_with("deleted file mode") {
            file.status = FileStatus::Deleted;
            file.target = None;
        } else if let Some(path) = line.strip_prefix("rename from ") {
            file.status = FileStatus::Renamed;
            file.source = Some(PathBuf::from(unquote(path)));
        } else if let Some(path) = line.strip_prefix("rename to ") {
            file.status = FileStatus::Renamed;
            file.target = Some(PathBuf::from(unquote(path)));
        } else if let Some(path) = line.strip_prefix("copy from ") {
            file.status = FileStatus::Copied;
            file.source = Some(PathBuf::from(unquote(path)));
        } else if let Some(path) = line.strip_prefix("copy to ") {
            file.status = FileStatus::Copied;
            file.target = Some(PathBuf::from(unquote(path)));
        }
    }

    fn parse_hunk(&mut self, number: usize, header: &str) -> Result<()> {
        let hunk = parse_hunk_header(header).ok_or_else(|| DiffError::MalformedHunkHeader {
            line: number,
            header: header.to_owned(),
        })?;
        let highest = hunk.source_start.saturating_add(hunk.source_length);
        if highest > MAX_LINE_NUMBER {
            return Err(DiffError::LineOutOfRange {
                line: number,
                value: highest,
            });
        }

        self.awaiting_headers = false;
        let file = self
            .files
            .last_mut()
            .ok_or(DiffError::HunkOutsideFile { line: number })?;
        file.hunks.push(hunk);

        let mut source_left = hunk.source_length;
        let mut target_left = hunk.target_length;
        let mut last_line = number;

        while source_left > 0 || target_left > 0 {
            let Some((number, body)) = self.next_line() else {
                return Err(DiffError::TruncatedHunk {
                    line: last_line,
                    source_left,
                    target_left,
                });
            };
            last_line = number;

            match body.as_bytes().first() {
                None | Some(b' ') => {
                    if source_left == 0 || target_left == 0 {
                        return Err(DiffError::UnexpectedHunkLine { line: number });
                    }
                    source_left -= 1;
                    target_left -= 1;
                }
                Some(b'-') => {
                    source_left = source_left
                        .checked_sub(1)
                        .ok_or(DiffError::UnexpectedHunkLine { line: number })?;
                }
                Some(b'+') => {
                    target_left = target_left
                        .checked_sub(1)
                        .ok_or(DiffError::UnexpectedHunkLine { line: number })?;
                }
                Some(b'\\') => {}
                Some(_) => {
                    return Err(DiffError::TruncatedHunk {
                        line: number,
                        source_left,
                        target_left,
                    });
                }
            }
        }

        Ok(())
    }
}

fn parse_hunk_header(line: &str) -> Option<Hunk> {
    let rest = line.strip_prefix("@@ -")?;
    let (ranges, _section) = rest.split_once(" @@")?;
    let (source, target) = ranges.split_once(" +")?;
    let (source_start, source_length) = parse_range(source)?;
    let (target_start, target_length) = parse_range(target)?;

    Some(Hunk::new(
        source_start,
        source_length,
        target_start,
        target_length,
    ))
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    match range.split_once(',') {
        Some((start, length)) => Some((start.parse().ok()?, length.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

fn unquote(path: &str) -> &str {
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path)
}

/// Path from a `---`/`+++` header with timestamp, quotes and side prefix removed.
fn header_path(raw: &str, side_prefix: &str) -> Option<PathBuf> {
    let raw = raw.split('\t').next().unwrap_or(raw).trim_end();
    let raw = unquote(raw);
    if raw == DEV_NULL {
        return None;
    }
    Some(PathBuf::from(raw.strip_prefix(side_prefix).unwrap_or(raw)))
}

fn split_git_paths(rest: &str) -> (Option<PathBuf>, Option<PathBuf>) {
    let rest = rest.trim_end();
    let pair = if rest.starts_with('"') {
        rest.split_once("\" \"")
            .map(|(a, b)| (a.trim_start_matches('"'), b.trim_end_matches('"')))
    } else {
        rest.split_once(" b/").map(|(a, _)| (a, &rest[a.len() + 1..]))
    };

    match pair {
        Some((source, target)) => (header_path(source, "a/"), header_path(target, "b/")),
        None => (None, None),
    }
}
