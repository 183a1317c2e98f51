mod baseline_source;
mod diff_source;

pub use baseline_source::BaselineSource;
pub use diff_source::DiffSource;
