use std::cell::RefCell;
use std::rc::{Rc, Weak};

use effects::{BurstStatus, ConfettiConfig, CounterConfig, ParticleCanvas};
use foundation::time::Time;
use runtime::{AnimationLoop, FrameThrottle, TickOutcome};
use session::Celebration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::canvas2d::Canvas2d;
use crate::dom;
use crate::notify::{PageCallbacks, PageNotice, notices};
use crate::ticks::RafTickSource;

struct CounterState {
    celebration: Celebration,
    canvas: Canvas2d,
    window: web_sys::Window,
    interval_ms: f64,
    interval: Option<i32>,
    interval_callback: Option<Closure<dyn FnMut()>>,
    ticks: RafTickSource,
    frames: Option<AnimationLoop<RafTickSource>>,
    on_update: Option<js_sys::Function>,
    callbacks: PageCallbacks,
}

impl CounterState {
    fn viewport(&self) -> (f64, f64) {
        let px = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        (px(self.window.inner_width()), px(self.window.inner_height()))
    }

    /// One counter interval. Returns the value to report to the page.
    fn step_counter(&mut self) -> f64 {
        let (w, h) = self.viewport();
        self.celebration.set_viewport(w, h);
        let step = self.celebration.step_counter();
        if step.target_reached {
            self.canvas.set_size(w as u32, h as u32);
            let mut frames = AnimationLoop::new(self.ticks.clone(), FrameThrottle::uncapped());
            frames.start();
            self.frames = Some(frames);
        }
        if step.settled {
            self.stop_interval();
        }
        step.value
    }

    fn on_frame(&mut self, now: Time) -> Vec<PageNotice> {
        let Some(frames) = self.frames.as_mut() else {
            return Vec::new();
        };
        if !matches!(frames.on_tick(now), TickOutcome::Frame(_)) {
            return Vec::new();
        }
        let status = self.celebration.step_confetti();
        self.celebration.draw_confetti(&mut self.canvas);
        if status != Some(BurstStatus::Running) {
            frames.dispose();
            self.frames = None;
            self.canvas.clear();
        }
        notices(self.celebration.drain_events())
    }

    /// The callback stays alive; this may run from inside it.
    fn stop_interval(&mut self) {
        if let Some(id) = self.interval.take() {
            self.window.clear_interval_with_handle(id);
        }
    }
}

fn install_interval(state: &Rc<RefCell<CounterState>>) {
    let weak: Weak<RefCell<CounterState>> = Rc::downgrade(state);
    let callback = Closure::<dyn FnMut()>::new(move || {
        let Some(state) = weak.upgrade() else {
            return;
        };
        let Ok(mut st) = state.try_borrow_mut() else {
            return;
        };
        let value = st.step_counter();
        let pending = notices(st.celebration.drain_events());
        let on_update = st.on_update.clone();
        let callbacks = st.callbacks.clone();
        drop(st);
        if let Some(f) = on_update {
            let _ = f.call1(&JsValue::NULL, &JsValue::from_f64(value));
        }
        callbacks.deliver(&pending);
    });
    state.borrow_mut().interval_callback = Some(callback);
}

fn start_interval(state: &Rc<RefCell<CounterState>>) -> Result<(), JsValue> {
    let mut st = state.borrow_mut();
    if st.interval.is_some() {
        return Ok(());
    }
    let Some(callback) = st.interval_callback.as_ref() else {
        return Ok(());
    };
    let id = st
        .window
        .set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            st.interval_ms.round() as i32,
        )?;
    st.interval = Some(id);
    Ok(())
}

/// Animated donation total with a confetti overlay when the goal is reached.
#[wasm_bindgen]
pub struct CounterHandle {
    state: Rc<RefCell<CounterState>>,
}

#[wasm_bindgen]
impl CounterHandle {
    /// `canvas_id` names the full-viewport overlay canvas. `on_update` receives the
    /// displayed value after every counter step, `on_target_reached` the target the first
    /// time the counter reaches it, and `on_burst_complete` `"confetti"` once the
    /// confetti has fallen.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        target: f64,
        current: f64,
        on_update: Option<js_sys::Function>,
        on_target_reached: Option<js_sys::Function>,
        on_burst_complete: Option<js_sys::Function>,
    ) -> Result<CounterHandle, JsValue> {
        let window = dom::window()?;
        let document = dom::document(&window)?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("canvas #{canvas_id} missing")))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))?;

        let counter = CounterConfig::default();
        let seed = js_sys::Math::random().to_bits();
        let mut celebration = Celebration::new(
            target,
            counter.clone(),
            ConfettiConfig::default(),
            (0.0, 0.0),
            seed,
        );
        celebration.set_current(current);

        let ticks = RafTickSource::new(window.clone());
        let state = Rc::new(RefCell::new(CounterState {
            celebration,
            canvas: Canvas2d::new(canvas)?,
            window,
            interval_ms: counter.interval_ms,
            interval: None,
            interval_callback: None,
            ticks: ticks.clone(),
            frames: None,
            on_update,
            callbacks: PageCallbacks {
                on_target_reached,
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
            let pending = st.on_frame(Time::from_millis(timestamp_ms));
            let callbacks = st.callbacks.clone();
            drop(st);
            callbacks.deliver(&pending);
        });

        install_interval(&state);
        start_interval(&state)?;
        Ok(CounterHandle { state })
    }

    pub fn set_current(&mut self, current: f64) -> Result<(), JsValue> {
        self.state.borrow_mut().celebration.set_current(current);
        start_interval(&self.state)
    }

    pub fn set_target(&mut self, target: f64) -> Result<(), JsValue> {
        self.state.borrow_mut().celebration.set_target(target);
        start_interval(&self.state)
    }

    pub fn display_value(&self) -> f64 {
        self.state.borrow().celebration.counter().display_value()
    }

    pub fn progress_percent(&self) -> f64 {
        self.state.borrow().celebration.counter().progress_percent()
    }

    pub fn remaining(&self) -> f64 {
        self.state.borrow().celebration.counter().remaining()
    }

    pub fn is_celebrating(&self) -> bool {
        self.state.borrow().celebration.is_celebrating()
    }

    pub fn dispose(&mut self) {
        let mut st = self.state.borrow_mut();
        st.stop_interval();
        if let Some(mut frames) = st.frames.take() {
            frames.dispose();
        }
        st.celebration.cancel();
        st.canvas.clear();
    }
}
