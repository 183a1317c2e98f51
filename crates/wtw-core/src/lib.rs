pub mod error;
pub mod linemask;
mod path;
pub mod types;

pub use error::*;
pub use linemask::{LineMask, contains, intersects};
pub use path::common_prefix;
pub use types::*;
