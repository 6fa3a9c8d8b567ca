pub mod marker;
pub mod pulse;
pub mod stylesheet;
pub mod symbology;

pub use marker::*;
pub use pulse::*;
pub use symbology::*;
