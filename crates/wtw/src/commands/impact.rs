use super::{Settings, build_filter, write_stdout};
use crate::error::Result;

pub(crate) fn run(settings: &Settings) -> Result<()> {
    let mut filter = build_filter(&settings.config)?;
    let output = settings.format.formatter().format_impact(filter.impact()?)?;
    write_stdout(&output)
}
