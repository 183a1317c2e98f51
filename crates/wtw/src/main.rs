mod commands;
mod error;
mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use wtw_operations::config::{self, ConfigOverrides, WtwConfig};

use crate::commands::{Commands, Settings};
use crate::error::CliError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "wtw")]
#[command(version)]
#[command(about = "Run only the tests whose recorded coverage touches a diff", long_about = None)]
struct Cli {
    /// Unified diff describing the change under test
    #[arg(
        long = "wtw",
        visible_alias = "who-tests-what",
        env = "WTW_DIFF",
        value_name = "DIFF",
        global = true
    )]
    diff: Option<PathBuf>,

    /// Coverage database recorded with per-test contexts
    #[arg(
        long = "wtwdb",
        visible_alias = "who-tests-what-db",
        env = "WTW_DB",
        value_name = "DB",
        global = true
    )]
    baseline: Option<PathBuf>,

    /// Diff the git work tree against this ref instead of reading a diff file
    #[arg(long = "wtw-base", env = "WTW_BASE", value_name = "REF", global = true)]
    git_base: Option<String>,

    /// Compare against this ref instead of the working tree (requires --wtw-base)
    #[arg(long = "wtw-head", value_name = "REF", requires = "git_base", global = true)]
    git_head: Option<String>,

    /// Project root (default: git work tree containing the current directory)
    #[arg(long = "root", short = 'C', global = true)]
    root: Option<PathBuf>,

    /// Lines of context added around each hunk [default: 1]
    #[arg(long, global = true)]
    padding: Option<u32>,

    /// Prefix mapping diff paths onto baseline paths, instead of inferring it
    #[arg(long, value_name = "PREFIX", global = true)]
    baseline_prefix: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain, global = true)]
    format: OutputFormat,

    /// Suppress the status line
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = match resolve_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = cli.command.execute(&settings) {
        print_error(&e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn resolve_settings(cli: &Cli) -> Result<Settings, CliError> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => config::discover_root(&std::env::current_dir().map_err(CliError::CurrentDir)?),
    };

    let overrides = ConfigOverrides {
        diff: cli.diff.clone(),
        git_base: cli.git_base.clone(),
        git_head: cli.git_head.clone(),
        baseline: cli.baseline.clone(),
        padding: cli.padding,
        baseline_prefix: cli.baseline_prefix.clone(),
    };

    Ok(Settings {
        config: WtwConfig::resolve(root, overrides)?,
        format: cli.format,
        quiet: cli.quiet,
    })
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn long_aliases_are_accepted() {
        let cli = Cli::try_parse_from([
            "wtw",
            "--who-tests-what",
            "change.diff",
            "--who-tests-what-db",
            ".coverage",
            "impact",
        ])
        .expect("valid arguments");

        assert_eq!(cli.diff, Some(PathBuf::from("change.diff")));
        assert_eq!(cli.baseline, Some(PathBuf::from(".coverage")));
    }

    #[test]
    fn head_requires_base() {
        let result = Cli::try_parse_from(["wtw", "--wtw-head", "HEAD", "impact"]);

        assert!(result.is_err());
    }
}
