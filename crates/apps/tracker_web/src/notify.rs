use runtime::{EVENT_BURST_COMPLETE, EVENT_TARGET_REACHED, Event};
use tracing::debug;
use wasm_bindgen::JsValue;

/// Something the embedding page asked to hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum PageNotice {
    TargetReached { target: f64 },
    /// `burst` is `"confetti"` or `"tree"`.
    BurstComplete { burst: String },
}

/// Picks the page-facing notices out of drained events; the rest are only logged.
pub fn notices(events: Vec<Event>) -> Vec<PageNotice> {
    events
        .into_iter()
        .filter_map(|event| match event.kind {
            EVENT_TARGET_REACHED => Some(PageNotice::TargetReached {
                target: event.message.parse().unwrap_or(f64::NAN),
            }),
            EVENT_BURST_COMPLETE => Some(PageNotice::BurstComplete {
                burst: event.message,
            }),
            _ => {
                debug!(kind = event.kind, message = %event.message, "event");
                None
            }
        })
        .collect()
}

/// Page callbacks, cloned out of shared state so they run with no borrow held.
#[derive(Debug, Clone, Default)]
pub struct PageCallbacks {
    pub on_target_reached: Option<js_sys::Function>,
    pub on_burst_complete: Option<js_sys::Function>,
}

impl PageCallbacks {
    pub fn deliver(&self, notices: &[PageNotice]) {
        for notice in notices {
            let (callback, arg) = match notice {
                PageNotice::TargetReached { target } => {
                    (&self.on_target_reached, JsValue::from_f64(*target))
                }
                PageNotice::BurstComplete { burst } => {
                    (&self.on_burst_complete, JsValue::from_str(burst))
                }
            };
            if let Some(f) = callback {
                let _ = f.call1(&JsValue::NULL, &arg);
            }
        }
    }
}
