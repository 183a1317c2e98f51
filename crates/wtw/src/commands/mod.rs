mod impact;
mod select;
mod skip;

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use tracing::debug;
use wtw_operations::config::{DiffInput, WtwConfig};
use wtw_operations::operations::{ImpactResolver, SelectionFilter};
use wtw_operations::providers::{FileDiffSource, GitDiffSource, SqliteBaseline};
use wtw_operations::traits::DiffSource;

use crate::error::{CliError, Result};
use crate::output::{OutputFormat, STATUS_PREFIX};

pub(crate) struct Settings {
    pub(crate) config: WtwConfig,
    pub(crate) format: OutputFormat,
    pub(crate) quiet: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print the candidate test files that can be left out of collection
    Skip(SkipArgs),
    /// Filter collected test ids down to those covering the change
    Select(SelectArgs),
    /// Show the changed files and the tests that cover them
    Impact,
}

#[derive(Args)]
pub(crate) struct SkipArgs {
    /// Candidate files (read from stdin, one per line, when omitted)
    pub(crate) paths: Vec<PathBuf>,
}

#[derive(Args)]
pub(crate) struct SelectArgs {
    /// File listing collected test ids, one per line (default: stdin)
    #[arg(long, value_name = "FILE")]
    pub(crate) items: Option<PathBuf>,

    /// File listing candidate test files to count skipped files against
    #[arg(long, value_name = "FILE")]
    pub(crate) candidates: Option<PathBuf>,

    /// Write the deselected test ids to this file
    #[arg(long, value_name = "FILE")]
    pub(crate) deselected: Option<PathBuf>,
}

impl Commands {
    pub(crate) fn execute(self, settings: &Settings) -> Result<()> {
        match self {
            Self::Skip(args) => skip::run(args, settings),
            Self::Select(args) => select::run(args, settings),
            Self::Impact => impact::run(settings),
        }
    }
}

type Filter = SelectionFilter<Box<dyn DiffSource>, SqliteBaseline>;

/// Builds the filter for `config`; inactive unless both a diff and a baseline
/// were supplied.
fn build_filter(config: &WtwConfig) -> Result<Filter> {
    let (Some(diff), Some(baseline)) = (config.diff(), config.baseline()) else {
        debug!("diff or baseline not configured, passing everything through");
        return Ok(SelectionFilter::inactive());
    };

    let diff_source: Box<dyn DiffSource> = match diff {
        DiffInput::File(path) => Box::new(FileDiffSource::new(path.clone())),
        DiffInput::Git { base, head } => Box::new(GitDiffSource::new(
            config.root().to_path_buf(),
            base.clone(),
            head.clone(),
        )),
    };
    let baseline = SqliteBaseline::open(baseline, config.baseline_prefix().map(str::to_owned))?;

    debug!(
        root = %config.root().display(),
        padding = config.padding(),
        "selection active"
    );

    Ok(SelectionFilter::active(
        ImpactResolver::new(config.root().to_path_buf(), diff_source, baseline)
            .with_padding(config.padding()),
    ))
}

/// Non-empty, trimmed lines of `path`, or of stdin when no path is given.
fn read_lines(path: Option<&Path>) -> Result<Vec<String>> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?,
        None => io::read_to_string(io::stdin())?,
    };

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

fn write_stdout(output: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn report_status(settings: &Settings, filter: &Filter) {
    if settings.quiet {
        return;
    }
    if let Some(status) = filter.status() {
        eprintln!("{STATUS_PREFIX}: {status}");
    }
}
