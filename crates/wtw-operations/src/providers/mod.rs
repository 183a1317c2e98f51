mod baseline;
mod diff;

pub use baseline::SqliteBaseline;
pub use diff::{FileDiffSource, GitDiffSource};
