use foundation::color::Rgb;
use foundation::math::{Mat4, Vec3};
use scene::components::{Material, Shape3D};
use scene::texture::TextureImage;
use scene::world::Lighting;

use crate::error::RenderError;
use crate::resources::ResourceId;

/// Drawing-buffer size in device pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width.max(1)) / f64::from(self.height.max(1))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCall {
    pub geometry: ResourceId,
    pub material: ResourceId,
    pub texture: Option<ResourceId>,
    pub model: Mat4,
    /// Per-frame opacity; overrides the material's when it animates.
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub view_proj: Mat4,
    /// Camera position, for specular shading.
    pub eye: Vec3,
    pub lighting: Lighting,
    pub background: Rgb,
    pub draws: Vec<DrawCall>,
}

/// Accelerated drawing target owned by one session.
///
/// The backend is the context: creating one acquires it and [`RenderBackend::destroy`]
/// loses it. Every `create_*` result must eventually be passed to `release`.
pub trait RenderBackend {
    fn size(&self) -> PhysicalSize;
    fn resize(&mut self, size: PhysicalSize);
    fn create_geometry(&mut self, shape: &Shape3D) -> Result<ResourceId, RenderError>;
    fn create_material(&mut self, material: &Material) -> Result<ResourceId, RenderError>;
    fn create_texture(&mut self, image: &TextureImage) -> Result<ResourceId, RenderError>;
    fn render(&mut self, frame: &RenderFrame) -> Result<(), RenderError>;
    fn release(&mut self, id: ResourceId);
    fn destroy(&mut self);
}
