use console_error_panic_hook::set_once;
use scene::data::{DonationPoint, FundsDistribution};
use serde::de::DeserializeOwned;
use session::views::{FundsMapConfig, FundsMapView, GlobeConfig, GlobeView};
use tracing::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod canvas2d;
mod counter;
mod dom;
mod donation;
mod log;
mod mesh;
mod mount;
mod notify;
mod texture;
mod ticks;
mod uniforms;
mod webgl_check;
mod wgpu;

pub use counter::CounterHandle;
pub use donation::DonationHandle;

use mount::{Mount, MountSlot, mount};
use texture::fetch_texture;

#[wasm_bindgen(start)]
pub fn start() {
    set_once();
    log::init("info");
}

fn parse<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("invalid {what}: {e}")))
}

fn parse_or_default<T: DeserializeOwned + Default>(
    what: &str,
    json: Option<String>,
) -> Result<T, JsValue> {
    json.map_or_else(|| Ok(T::default()), |j| parse(what, &j))
}

/// Rotating globe with a marker per donation.
#[wasm_bindgen]
pub struct GlobeHandle {
    slot: MountSlot<GlobeView>,
}

#[wasm_bindgen]
impl GlobeHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: &str,
        donations_json: &str,
        config_json: Option<String>,
    ) -> Result<GlobeHandle, JsValue> {
        let donations: Vec<DonationPoint> = parse("donations", donations_json)?;
        let config: GlobeConfig = parse_or_default("globe config", config_json)?;
        let container = dom::element_by_id(&dom::document(&dom::window()?)?, container_id)?;

        let texture_url = config.earth_texture_url.clone();
        let view = GlobeView::new(config, donations);
        let slot = Mount::slot();
        let task_slot = slot.clone();
        spawn_local(async move {
            match mount(task_slot.clone(), container, view, true).await {
                Ok("accelerated") => {
                    let loaded = fetch_texture(&texture_url).await;
                    task_slot
                        .borrow_mut()
                        .with_view(move |v| v.offer_earth_texture(loaded));
                }
                Ok(_) => {}
                Err(e) => error!(error = ?e, "globe mount failed"),
            }
        });
        Ok(GlobeHandle { slot })
    }

    pub fn set_donations(&mut self, donations_json: &str) -> Result<(), JsValue> {
        let donations: Vec<DonationPoint> = parse("donations", donations_json)?;
        self.slot
            .borrow_mut()
            .with_view(move |v| v.set_donations(donations));
        Ok(())
    }

    /// `"pending"`, `"accelerated"`, `"static"` or `"error"`.
    pub fn presentation(&self) -> String {
        self.slot.borrow().kind().to_string()
    }

    pub fn dispose(&mut self) -> bool {
        self.slot.borrow_mut().dispose()
    }
}

/// 3D bar chart of fund allocation.
#[wasm_bindgen]
pub struct FundsMapHandle {
    slot: MountSlot<FundsMapView>,
}

#[wasm_bindgen]
impl FundsMapHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: &str,
        distributions_json: &str,
        config_json: Option<String>,
    ) -> Result<FundsMapHandle, JsValue> {
        let distributions: Vec<FundsDistribution> = parse("distributions", distributions_json)?;
        let config: FundsMapConfig = parse_or_default("funds map config", config_json)?;
        let container = dom::element_by_id(&dom::document(&dom::window()?)?, container_id)?;

        let view = FundsMapView::new(config, distributions);
        let slot = Mount::slot();
        let task_slot = slot.clone();
        spawn_local(async move {
            if let Err(e) = mount(task_slot, container, view, false).await {
                error!(error = ?e, "funds map mount failed");
            }
        });
        Ok(FundsMapHandle { slot })
    }

    pub fn set_distributions(&mut self, distributions_json: &str) -> Result<(), JsValue> {
        let distributions: Vec<FundsDistribution> = parse("distributions", distributions_json)?;
        self.slot
            .borrow_mut()
            .with_view(move |v| v.set_distributions(distributions));
        Ok(())
    }

    pub fn presentation(&self) -> String {
        self.slot.borrow().kind().to_string()
    }

    pub fn dispose(&mut self) -> bool {
        self.slot.borrow_mut().dispose()
    }
}
