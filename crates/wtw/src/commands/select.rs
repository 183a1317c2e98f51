use std::path::Path;

use super::{SelectArgs, Settings, build_filter, read_lines, report_status, write_stdout};
use crate::error::{CliError, Result};

pub(crate) fn run(args: SelectArgs, settings: &Settings) -> Result<()> {
    let mut filter = build_filter(&settings.config)?;

    if let Some(candidates) = &args.candidates {
        for path in read_lines(Some(candidates))? {
            filter.should_skip(Path::new(&path))?;
        }
    }

    let items = read_lines(args.items.as_deref())?;
    let selection = filter.select(items)?;

    if let Some(path) = &args.deselected {
        let mut content = selection.deselected.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        std::fs::write(path, content).map_err(|source| CliError::WriteOutput {
            path: path.clone(),
            source,
        })?;
    }

    write_stdout(
        &settings
            .format
            .formatter()
            .format_selection(&selection, filter.status())?,
    )?;
    report_status(settings, &filter);
    Ok(())
}
