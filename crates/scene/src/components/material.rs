use foundation::color::Rgb;

use crate::texture::TextureKey;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shading {
    /// Unlit flat color.
    Basic,
    /// Diffuse lighting only.
    Lambert,
    /// Diffuse plus specular highlight.
    Phong { shininess: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub shading: Shading,
    pub color: Rgb,
    pub emissive: Rgb,
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
    pub texture: Option<TextureKey>,
}

impl Material {
    pub fn basic(color: Rgb) -> Self {
        Self {
            shading: Shading::Basic,
            color,
            emissive: Rgb::BLACK,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
            texture: None,
        }
    }

    pub fn lambert(color: Rgb) -> Self {
        Self {
            shading: Shading::Lambert,
            ..Self::basic(color)
        }
    }

    pub fn phong(color: Rgb, shininess: f32) -> Self {
        Self {
            shading: Shading::Phong { shininess },
            ..Self::basic(color)
        }
    }

    /// Marks the material as alpha-blended with the given opacity.
    pub fn translucent(mut self, opacity: f32) -> Self {
        self.transparent = true;
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_emissive(mut self, emissive: Rgb) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_texture(mut self, texture: TextureKey) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }
}
