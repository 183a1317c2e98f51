use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("cannot encode an empty line set into a linemask")]
    EmptyLineSet,
}

pub type Result<T> = std::result::Result<T, EncodingError>;
