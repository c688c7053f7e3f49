use std::cell::RefCell;
use std::rc::Rc;

use foundation::time::Time;
use gpu::{Capability, CapabilityDetector, RenderError};
use session::views::SceneView;
use session::{AnimationSession, Presentation, present};
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::ticks::RafTickSource;
use crate::webgl_check::WebGlCheck;
use crate::wgpu::WgpuBackend;

pub type WebSession<V> = AnimationSession<V, WgpuBackend, RafTickSource>;

type ViewEdit<V> = Box<dyn FnOnce(&mut V)>;

/// Shared home of a view mounted asynchronously. Edits made before the session exists are
/// queued and applied once it does.
pub struct Mount<V: SceneView> {
    session: Option<WebSession<V>>,
    kind: Option<&'static str>,
    cancelled: bool,
    queued: Vec<ViewEdit<V>>,
}

pub type MountSlot<V> = Rc<RefCell<Mount<V>>>;

impl<V: SceneView + 'static> Mount<V> {
    pub fn slot() -> MountSlot<V> {
        Rc::new(RefCell::new(Self {
            session: None,
            kind: None,
            cancelled: false,
            queued: Vec::new(),
        }))
    }

    pub fn kind(&self) -> &'static str {
        self.kind.unwrap_or("pending")
    }

    pub fn with_view(&mut self, edit: impl FnOnce(&mut V) + 'static) {
        if let Some(session) = self.session.as_mut() {
            edit(session.view_mut());
        } else if self.kind.is_none() && !self.cancelled {
            self.queued.push(Box::new(edit));
        }
    }

    pub fn dispose(&mut self) -> bool {
        self.cancelled = true;
        self.queued.clear();
        self.session.take().is_some_and(|mut s| s.dispose())
    }
}

/// Detects WebGL, then mounts `view` into `container` or renders its fallback there.
pub async fn mount<V: SceneView + 'static>(
    slot: MountSlot<V>,
    container: web_sys::HtmlElement,
    view: V,
    track_pointer: bool,
) -> Result<&'static str, JsValue> {
    let window = dom::window()?;
    let document = dom::document(&window)?;
    let size = dom::container_size(&window, &container);
    let canvas = dom::append_canvas(&document, &container)?;

    let mut detector = CapabilityDetector::new(WebGlCheck::new(document.clone()));
    let backend = match detector.detect() {
        Capability::Capable => WgpuBackend::acquire(canvas.clone(), size.physical()).await,
        Capability::NotCapable => Err(RenderError::ContextCreationFailed(
            "WebGL unavailable".to_string(),
        )),
    };
    if slot.borrow().cancelled {
        canvas.remove();
        return Ok("cancelled");
    }

    let ticks = RafTickSource::new(window.clone());
    let weak = Rc::downgrade(&slot);
    ticks.install(move |timestamp_ms| {
        let Some(slot) = weak.upgrade() else {
            return;
        };
        if let Ok(mut mount) = slot.try_borrow_mut()
            && let Some(session) = mount.session.as_mut()
        {
            session.on_tick(Time::from_millis(timestamp_ms));
            for event in session.drain_events() {
                debug!(kind = event.kind, message = %event.message, "session event");
            }
        }
    });

    let presentation = present(&mut detector, view, ticks, size, move |_| backend);
    let kind = presentation.kind();
    match presentation {
        Presentation::Accelerated(mut session) => {
            listen_resize(&window, &container, &slot, &mut session)?;
            if track_pointer {
                listen_pointer(&document, &container, &slot, &mut session)?;
            }
            let mut mount = slot.borrow_mut();
            for edit in mount.queued.drain(..) {
                edit(session.view_mut());
            }
            mount.session = Some(session);
        }
        Presentation::Static(fallback) => {
            canvas.remove();
            dom::render_static_map(&document, &container, &fallback)?;
        }
        Presentation::Error(notice) => {
            canvas.remove();
            dom::render_error(&document, &container, &notice)?;
        }
    }
    let mut mount = slot.borrow_mut();
    mount.kind = Some(kind);
    mount.queued.clear();
    debug!(kind, "view presented");
    Ok(kind)
}

fn listen_resize<V: SceneView + 'static>(
    window: &web_sys::Window,
    container: &web_sys::HtmlElement,
    slot: &MountSlot<V>,
    session: &mut WebSession<V>,
) -> Result<(), JsValue> {
    let weak = Rc::downgrade(slot);
    let win = window.clone();
    let container = container.clone();
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        let size = dom::container_size(&win, &container);
        if let Some(slot) = weak.upgrade()
            && let Ok(mut mount) = slot.try_borrow_mut()
            && let Some(session) = mount.session.as_mut()
        {
            session.observe_resize(size);
        }
    });
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;

    let target = window.clone();
    session.register_listener("window-resize", move || {
        let _ = target
            .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
    });
    Ok(())
}

fn listen_pointer<V: SceneView + 'static>(
    document: &web_sys::Document,
    container: &web_sys::HtmlElement,
    slot: &MountSlot<V>,
    session: &mut WebSession<V>,
) -> Result<(), JsValue> {
    let weak = Rc::downgrade(slot);
    let container = container.clone();
    let on_move = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
        let rect = container.get_bounding_client_rect();
        let x = f64::from(e.client_x()) - rect.left();
        let y = f64::from(e.client_y()) - rect.top();
        if let Some(slot) = weak.upgrade()
            && let Ok(mut mount) = slot.try_borrow_mut()
            && let Some(session) = mount.session.as_mut()
        {
            session.set_pointer_px(x, y);
        }
    });
    document.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;

    let target = document.clone();
    session.register_listener("document-mousemove", move || {
        let _ = target
            .remove_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref());
    });
    Ok(())
}
