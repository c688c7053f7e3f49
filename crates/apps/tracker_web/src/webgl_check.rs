use gpu::ContextCheck;
use wasm_bindgen::JsCast;

/// Asks a throwaway canvas for a WebGL context. The answer is remembered.
pub struct WebGlCheck {
    document: web_sys::Document,
    cached: Option<bool>,
}

impl WebGlCheck {
    pub fn new(document: web_sys::Document) -> Self {
        Self {
            document,
            cached: None,
        }
    }
}

impl ContextCheck for WebGlCheck {
    fn try_context(&mut self) -> Result<bool, String> {
        if let Some(capable) = self.cached {
            return Ok(capable);
        }
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(|e| format!("{e:?}"))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| "created element is not a canvas".to_string())?;

        let mut capable = false;
        for kind in ["webgl2", "webgl", "experimental-webgl"] {
            if let Ok(Some(_)) = canvas.get_context(kind) {
                capable = true;
                break;
            }
        }
        self.cached = Some(capable);
        Ok(capable)
    }
}
