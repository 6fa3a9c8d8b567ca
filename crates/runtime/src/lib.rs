pub mod frame;
pub mod timeline;

pub use frame::*;
pub use timeline::*;
