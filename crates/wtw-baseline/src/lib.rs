mod error;
mod functions;
mod schema;
mod store;
#[cfg(any(test, feature = "testing"))]
mod testing;

pub use error::BaselineError;
pub use schema::{LineLayout, Schema};
pub use store::{BaselineStore, Resolution};
#[cfg(any(test, feature = "testing"))]
pub use testing::BaselineBuilder;

/// Name of the table the current diff's line masks are staged into.
pub const STAGING_TABLE: &str = "diff_lines";

pub type Result<T> = std::result::Result<T, BaselineError>;
