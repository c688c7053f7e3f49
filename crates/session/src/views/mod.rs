pub mod funds_map;
pub mod globe;

pub use funds_map::*;
pub use globe::*;

use foundation::math::Vec2;
use gpu::PerspectiveCamera;
use runtime::Frame;
use scene::World;

use crate::fallback::Fallback2D;

/// Content of one mounted visualization: builds its scene once, then animates it per frame.
pub trait SceneView {
    fn name(&self) -> &'static str;

    /// Frame-rate cap; `None` renders on every host frame.
    fn fps_cap(&self) -> Option<f64>;

    fn camera(&self) -> PerspectiveCamera;

    fn build(&mut self, world: &mut World);

    /// Applies queued data or texture changes. Runs each frame before `animate`.
    fn update(&mut self, _world: &mut World) {}

    /// `pointer` is in `[-1, 1]` on both axes, relative to the container.
    fn animate(&mut self, world: &mut World, frame: &Frame, pointer: Vec2);

    /// Static replacement shown when no accelerated context exists.
    fn fallback(&self) -> Option<Fallback2D> {
        None
    }
}
