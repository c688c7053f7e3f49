pub mod backend;
pub mod camera;
pub mod capability;
pub mod error;
pub mod headless;
pub mod renderer;
pub mod resources;

pub use backend::*;
pub use camera::*;
pub use capability::*;
pub use error::*;
pub use renderer::*;
pub use resources::*;
