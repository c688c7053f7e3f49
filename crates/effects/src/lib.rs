pub mod confetti;
pub mod counter;
pub mod particles;
pub mod render;
pub mod tree;

pub use confetti::*;
pub use counter::*;
pub use particles::*;
pub use render::*;
pub use tree::*;
