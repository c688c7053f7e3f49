//! Uniform layouts shared with the WGSL shader, and draw ordering.

use gpu::{DrawCall, RenderFrame};
use scene::components::{Material, Shading};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    /// Ambient color premultiplied by intensity.
    pub ambient: [f32; 4],
    /// Unit vector from the surface toward the light.
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub eye: [f32; 4],
}

impl Globals {
    pub fn from_frame(frame: &RenderFrame) -> Self {
        let l = &frame.lighting;
        let premul = |rgb: [f32; 3], k: f32| [rgb[0] * k, rgb[1] * k, rgb[2] * k, 1.0];
        let dir = l.directional_from.normalize().as_f32_array();
        let eye = frame.eye.as_f32_array();
        Self {
            view_proj: frame.view_proj.to_f32_cols(),
            ambient: premul(l.ambient_color.to_unit_rgb(), l.ambient_intensity),
            light_dir: [dir[0], dir[1], dir[2], 0.0],
            light_color: premul(l.directional_color.to_unit_rgb(), l.directional_intensity),
            eye: [eye[0], eye[1], eye[2], 1.0],
        }
    }
}

pub const SHADING_BASIC: f32 = 0.0;
pub const SHADING_LAMBERT: f32 = 1.0;
pub const SHADING_PHONG: f32 = 2.0;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    /// rgb, opacity
    pub color: [f32; 4],
    /// rgb, shininess
    pub emissive: [f32; 4],
    /// x: shading model, y: 1 when textured
    pub params: [f32; 4],
}

impl DrawUniform {
    pub fn new(material: &Material, call: &DrawCall) -> Self {
        let [r, g, b] = material.color.to_unit_rgb();
        let [er, eg, eb] = material.emissive.to_unit_rgb();
        let (shading, shininess) = match material.shading {
            Shading::Basic => (SHADING_BASIC, 0.0),
            Shading::Lambert => (SHADING_LAMBERT, 0.0),
            Shading::Phong { shininess } => (SHADING_PHONG, shininess),
        };
        let opacity = if material.transparent {
            call.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            model: call.model.to_f32_cols(),
            color: [r, g, b, opacity],
            emissive: [er, eg, eb, shininess],
            params: [shading, if call.texture.is_some() { 1.0 } else { 0.0 }, 0.0, 0.0],
        }
    }
}

/// Dynamic-offset stride for one [`DrawUniform`].
pub fn draw_stride(min_alignment: u32) -> u64 {
    let size = std::mem::size_of::<DrawUniform>() as u64;
    let align = u64::from(min_alignment.max(1));
    size.div_ceil(align) * align
}

/// Opaque draws first, then blended ones; each group keeps scene order.
pub fn draw_order<'a>(
    draws: &'a [DrawCall],
    is_blended: impl Fn(&DrawCall) -> bool,
) -> Vec<(usize, &'a DrawCall)> {
    let (mut opaque, blended): (Vec<_>, Vec<_>) =
        draws.iter().enumerate().partition(|(_, d)| !is_blended(d));
    opaque.extend(blended);
    opaque
}
