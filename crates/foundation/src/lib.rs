pub mod lnglat;
pub mod math;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use lnglat::*;
pub use time::*;
