use std::cell::RefCell;
use std::rc::Rc;

use runtime::{TickId, TickSource};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` clock. The callback is installed after construction because it
/// usually needs a handle to whatever owns this source.
#[derive(Clone)]
pub struct RafTickSource {
    window: web_sys::Window,
    callback: FrameCallback,
}

impl RafTickSource {
    pub fn new(window: web_sys::Window) -> Self {
        Self {
            window,
            callback: Rc::new(RefCell::new(None)),
        }
    }

    pub fn install(&self, on_frame: impl FnMut(f64) + 'static) {
        *self.callback.borrow_mut() = Some(Closure::new(on_frame));
    }
}

impl TickSource for RafTickSource {
    fn request(&mut self) -> TickId {
        let callback = self.callback.borrow();
        let Some(cb) = callback.as_ref() else {
            warn!("frame requested before a callback was installed");
            return TickId(0);
        };
        match self
            .window
            .request_animation_frame(cb.as_ref().unchecked_ref())
        {
            Ok(id) => TickId(id as u64),
            Err(e) => {
                warn!(error = ?e, "requestAnimationFrame failed");
                TickId(0)
            }
        }
    }

    fn cancel(&mut self, id: TickId) {
        if id.0 != 0 {
            let _ = self.window.cancel_animation_frame(id.0 as i32);
        }
    }
}

/// Milliseconds on the same clock as animation frame timestamps.
pub fn now_ms(window: &web_sys::Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}
