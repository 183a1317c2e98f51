use std::path::PathBuf;

use wtw_core::ImpactResult;
use wtw_operations::operations::Selection;

use crate::error::Result;

pub(crate) trait OutputFormatter {
    fn format_paths(&self, paths: &[PathBuf]) -> Result<String>;
    fn format_selection(&self, selection: &Selection<String>, status: Option<&str>)
    -> Result<String>;
    fn format_impact(&self, impact: Option<&ImpactResult>) -> Result<String>;
}
