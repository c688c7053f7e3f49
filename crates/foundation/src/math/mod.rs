pub mod mat4;
pub mod projection;
pub mod vec;

pub use mat4::*;
pub use projection::*;
pub use vec::*;
