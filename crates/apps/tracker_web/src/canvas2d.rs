use effects::ParticleCanvas;
use foundation::color::Rgb;
use foundation::math::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Particle drawing onto a 2D canvas element.
pub struct Canvas2d {
    canvas: web_sys::HtmlCanvasElement,
    ctx: web_sys::CanvasRenderingContext2d,
}

impl Canvas2d {
    pub fn new(canvas: web_sys::HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<web_sys::CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn set_size(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    pub fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }
}

impl ParticleCanvas for Canvas2d {
    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn fill_rotated_rect(&mut self, center: Vec2, size: f64, rotation: f64, color: Rgb) {
        self.ctx.save();
        let _ = self.ctx.translate(center.x, center.y);
        let _ = self.ctx.rotate(rotation);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(-size / 2.0, -size / 2.0, size, size);
        self.ctx.restore();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f64) {
        self.ctx.save();
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0));
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(center.x, center.y, radius.max(0.0), 0.0, std::f64::consts::TAU);
        self.ctx.fill();
        self.ctx.restore();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f64, color: Rgb) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }
}
