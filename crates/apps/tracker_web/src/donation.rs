use std::cell::RefCell;
use std::rc::Rc;

use effects::ParticleCanvas;
use foundation::time::Time;
use runtime::{AnimationLoop, FrameThrottle, TickOutcome};
use session::{DonationPanel, DonationPresets};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::canvas2d::Canvas2d;
use crate::dom;
use crate::notify::{PageCallbacks, PageNotice, notices};
use crate::ticks::{RafTickSource, now_ms};

struct DonationState {
    panel: DonationPanel,
    canvas: Canvas2d,
    window: web_sys::Window,
    ticks: RafTickSource,
    frames: Option<AnimationLoop<RafTickSource>>,
    on_donate: js_sys::Function,
    callbacks: PageCallbacks,
}

impl DonationState {
    /// Returns the committed amount, if one came due this frame, and the page notices.
    fn on_frame(&mut self, now: Time) -> (Option<f64>, Vec<PageNotice>) {
        let Some(frames) = self.frames.as_mut() else {
            return (None, Vec::new());
        };
        if !matches!(frames.on_tick(now), TickOutcome::Frame(_)) {
            return (None, Vec::new());
        }
        let committed = self.panel.poll_commit(now);
        self.panel.step_tree();
        if self.panel.tree().is_some() {
            self.panel.draw_tree(&mut self.canvas);
        } else {
            self.canvas.clear();
        }
        let pending = notices(self.panel.drain_events());
        if !self.panel.is_animating() && self.panel.tree().is_none() {
            frames.dispose();
            self.frames = None;
        }
        (committed, pending)
    }

    fn ensure_running(&mut self) {
        if self.frames.as_ref().is_some_and(|f| f.is_running()) {
            return;
        }
        let mut frames = AnimationLoop::new(self.ticks.clone(), FrameThrottle::uncapped());
        frames.start();
        self.frames = Some(frames);
    }
}

/// Amount picker plus the tree burst that plays while a donation is being sent.
#[wasm_bindgen]
pub struct DonationHandle {
    state: Rc<RefCell<DonationState>>,
}

#[wasm_bindgen]
impl DonationHandle {
    /// `on_donate` receives the amount once the animation delay has passed;
    /// `on_burst_complete` receives `"tree"` when each tree burst finishes.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        presets_json: Option<String>,
        on_donate: js_sys::Function,
        on_burst_complete: Option<js_sys::Function>,
    ) -> Result<DonationHandle, JsValue> {
        let presets: DonationPresets = match presets_json {
            Some(json) => serde_json::from_str(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => DonationPresets::default(),
        };
        let window = dom::window()?;
        let document = dom::document(&window)?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("canvas #{canvas_id} missing")))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))?;
        let canvas = Canvas2d::new(canvas)?;
        canvas.set_size(presets.tree.width as u32, presets.tree.height as u32);

        let seed = js_sys::Math::random().to_bits();
        let ticks = RafTickSource::new(window.clone());
        let state = Rc::new(RefCell::new(DonationState {
            panel: DonationPanel::new(presets, seed),
            canvas,
            window,
            ticks: ticks.clone(),
            frames: None,
            on_donate,
            callbacks: PageCallbacks {
                on_target_reached: None,
                on_burst_complete,
            },
        }));

        let weak = Rc::downgrade(&state);
        ticks.install(move |timestamp_ms| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let Ok(mut st) = state.try_borrow_mut() else {
                return;
            };
            let (committed, pending) = st.on_frame(Time::from_millis(timestamp_ms));
            let on_donate = st.on_donate.clone();
            let callbacks = st.callbacks.clone();
            drop(st);
            if let Some(amount) = committed {
                let _ = on_donate.call1(&JsValue::NULL, &JsValue::from_f64(amount));
            }
            callbacks.deliver(&pending);
        });

        Ok(DonationHandle { state })
    }

    pub fn presets(&self) -> Vec<f64> {
        self.state.borrow().panel.presets().to_vec()
    }

    pub fn selected(&self) -> f64 {
        self.state.borrow().panel.selected()
    }

    pub fn select_preset(&mut self, index: usize) -> Option<f64> {
        self.state.borrow_mut().panel.select_preset(index)
    }

    pub fn select_custom(&mut self, amount: f64) -> Result<f64, JsValue> {
        self.state
            .borrow_mut()
            .panel
            .select_custom(amount)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn is_animating(&self) -> bool {
        self.state.borrow().panel.is_animating()
    }

    pub fn donate(&mut self) -> Result<f64, JsValue> {
        let mut st = self.state.borrow_mut();
        let now = Time::from_millis(now_ms(&st.window));
        let amount = st
            .panel
            .donate(now)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        st.ensure_running();
        Ok(amount)
    }

    pub fn dispose(&mut self) {
        let mut st = self.state.borrow_mut();
        if let Some(mut frames) = st.frames.take() {
            frames.dispose();
        }
        st.panel.cancel();
        st.canvas.clear();
    }
}
