pub mod animation;
pub mod event_bus;
pub mod frame;
pub mod stats;
pub mod throttle;

pub use animation::*;
pub use event_bus::*;
pub use frame::*;
pub use stats::*;
pub use throttle::*;
