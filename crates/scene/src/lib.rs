pub mod overlay;
pub mod picking;
pub mod selection;

pub use overlay::*;
pub use selection::*;
