pub mod celebration;
pub mod donation;
pub mod error;
pub mod fallback;
pub mod resize;
pub mod session;
pub mod views;

pub use celebration::*;
pub use donation::*;
pub use error::*;
pub use fallback::*;
pub use resize::*;
pub use session::*;
