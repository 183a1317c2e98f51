use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Diff(#[from] wtw_diff::DiffError),

    #[error(transparent)]
    Baseline(#[from] wtw_baseline::BaselineError),

    #[error("failed to read diff '{path}'")]
    DiffRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config file '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("padding must be a non-negative line count, got {value}")]
    InvalidPadding { value: i64 },
}

pub type Result<T> = std::result::Result<T, OperationError>;
