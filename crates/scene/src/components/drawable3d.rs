use crate::components::Material;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape3D {
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    /// Upright cylinder centered on its origin.
    Cylinder {
        radius: f64,
        height: f64,
        radial_segments: u32,
    },
    /// Flat rectangle in the local XY plane.
    Plane { width: f64, height: f64 },
    /// Square line grid in the XZ plane.
    Grid { size: f64, divisions: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drawable3D {
    pub shape: Shape3D,
    pub material: Material,
}

impl Drawable3D {
    pub fn new(shape: Shape3D, material: Material) -> Self {
        Self { shape, material }
    }

    pub fn sphere(radius: f64, segments: u32, material: Material) -> Self {
        Self::new(
            Shape3D::Sphere {
                radius,
                width_segments: segments,
                height_segments: segments,
            },
            material,
        )
    }

    pub fn cylinder(radius: f64, height: f64, radial_segments: u32, material: Material) -> Self {
        Self::new(
            Shape3D::Cylinder {
                radius,
                height,
                radial_segments,
            },
            material,
        )
    }
}
