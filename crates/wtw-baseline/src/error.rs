use std::path::PathBuf;

use thiserror::Error;
use wtw_core::EncodingError;

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("failed to open baseline '{path}'")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("baseline '{path}' is missing table(s): {}", missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },

    #[error("baseline '{path}' does not match the expected schema")]
    SchemaMismatch {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to encode changed lines of '{path}'")]
    Encoding {
        path: PathBuf,
        #[source]
        source: EncodingError,
    },

    #[error("baseline query failed")]
    Query(#[from] rusqlite::Error),
}

impl BaselineError {
    /// Routes "no such table/column" failures to [`BaselineError::SchemaMismatch`].
    pub(crate) fn from_query(path: &std::path::Path, source: rusqlite::Error) -> Self {
        let schema_related = matches!(
            &source,
            rusqlite::Error::SqliteFailure(_, Some(message))
                if message.starts_with("no such table") || message.starts_with("no such column")
        );

        if schema_related {
            Self::SchemaMismatch {
                path: path.to_path_buf(),
                source,
            }
        } else {
            Self::Query(source)
        }
    }
}
