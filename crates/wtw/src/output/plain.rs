use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::PathBuf;

use wtw_core::ImpactResult;
use wtw_operations::operations::Selection;

use super::OutputFormatter;
use crate::error::Result;

pub(crate) struct PlainTextFormatter;

impl PlainTextFormatter {
    fn format_section<T: Display>(
        output: &mut String,
        title: &str,
        entries: impl ExactSizeIterator<Item = T>,
    ) {
        output.push_str(&format!("{title} ({}):\n", entries.len()));
        for entry in entries {
            output.push_str(&format!("  {entry}\n"));
        }
    }

    fn format_path_set(output: &mut String, title: &str, paths: &BTreeSet<PathBuf>) {
        Self::format_section(output, title, paths.iter().map(|path| path.display()));
    }
}

impl OutputFormatter for PlainTextFormatter {
    fn format_paths(&self, paths: &[PathBuf]) -> Result<String> {
        let mut output = String::new();
        for path in paths {
            output.push_str(&format!("{}\n", path.display()));
        }
        Ok(output)
    }

    fn format_selection(
        &self,
        selection: &Selection<String>,
        _status: Option<&str>,
    ) -> Result<String> {
        let mut output = String::new();
        for item in &selection.selected {
            output.push_str(item);
            output.push('\n');
        }
        Ok(output)
    }

    fn format_impact(&self, impact: Option<&ImpactResult>) -> Result<String> {
        let Some(impact) = impact else {
            return Ok(String::new());
        };

        let mut output = String::new();
        Self::format_path_set(&mut output, "Changed files", &impact.files_changed);
        output.push('\n');
        Self::format_path_set(&mut output, "Files with covering tests", &impact.context_files);
        output.push('\n');
        Self::format_section(&mut output, "Covering tests", impact.contexts.iter());
        Ok(output)
    }
}
