use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Operation(#[from] wtw_operations::OperationError),

    #[error("failed to determine current directory")]
    CurrentDir(#[source] std::io::Error),

    #[error("failed to read '{path}'")]
    ReadInput {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}'")]
    WriteOutput {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize output")]
    Json(#[from] serde_json::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
