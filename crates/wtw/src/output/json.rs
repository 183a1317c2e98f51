use std::path::PathBuf;

use serde::Serialize;
use wtw_core::ImpactResult;
use wtw_operations::operations::Selection;

use super::OutputFormatter;
use crate::error::Result;

pub(crate) struct JsonFormatter;

#[derive(Serialize)]
struct SelectionReport<'a> {
    selected: &'a [String],
    deselected: &'a [String],
    status: Option<&'a str>,
}

impl OutputFormatter for JsonFormatter {
    fn format_paths(&self, paths: &[PathBuf]) -> Result<String> {
        Ok(serde_json::to_string_pretty(paths)? + "\n")
    }

    fn format_selection(
        &self,
        selection: &Selection<String>,
        status: Option<&str>,
    ) -> Result<String> {
        let report = SelectionReport {
            selected: &selection.selected,
            deselected: &selection.deselected,
            status,
        };
        Ok(serde_json::to_string_pretty(&report)? + "\n")
    }

    fn format_impact(&self, impact: Option<&ImpactResult>) -> Result<String> {
        Ok(serde_json::to_string_pretty(&impact)? + "\n")
    }
}
