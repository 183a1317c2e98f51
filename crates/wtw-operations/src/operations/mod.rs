mod impact;
mod selection;

pub use impact::ImpactResolver;
pub use selection::{Selection, SelectionFilter};
