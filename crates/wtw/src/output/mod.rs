mod formatter;
mod json;
mod plain;

use clap::ValueEnum;

pub(crate) use formatter::OutputFormatter;
pub(crate) use json::JsonFormatter;
pub(crate) use plain::PlainTextFormatter;

/// Prefix of the status line written to stderr.
pub(crate) const STATUS_PREFIX: &str = "who-tests-what";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Plain,
    Json,
}

impl OutputFormat {
    pub(crate) fn formatter(self) -> Box<dyn OutputFormatter> {
        match self {
            Self::Plain => Box::new(PlainTextFormatter),
            Self::Json => Box::new(JsonFormatter),
        }
    }
}
