use std::path::PathBuf;

use super::{Settings, SkipArgs, build_filter, read_lines, write_stdout};
use crate::error::Result;

pub(crate) fn run(args: SkipArgs, settings: &Settings) -> Result<()> {
    let candidates = if args.paths.is_empty() {
        read_lines(None)?.into_iter().map(PathBuf::from).collect()
    } else {
        args.paths
    };

    let mut filter = build_filter(&settings.config)?;

    let mut skipped = Vec::new();
    for path in candidates {
        if filter.should_skip(&path)? {
            skipped.push(path);
        }
    }

    write_stdout(&settings.format.formatter().format_paths(&skipped)?)
}
