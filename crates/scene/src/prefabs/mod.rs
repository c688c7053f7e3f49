pub mod funds_map;
pub mod globe;

pub use funds_map::*;
pub use globe::*;
