use foundation::math::{Mat4, Vec3};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl PerspectiveCamera {
    pub fn look_at(position: Vec3, target: Vec3, fov_y_deg: f64, near: f64, far: f64) -> Self {
        Self {
            position,
            target,
            up: Vec3::new(0.0, 1.0, 0.0),
            fov_y_deg,
            aspect: 1.0,
            near,
            far,
        }
    }

    /// Ignores degenerate aspect ratios (zero-sized containers).
    pub fn set_aspect(&mut self, aspect: f64) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_z0(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection().mul(&self.view())
    }
}

#[cfg(test)]
mod tests {
    use super::PerspectiveCamera;
    use foundation::math::Vec3;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 75.0, 0.1, 1000.0)
    }

    #[test]
    fn target_projects_to_screen_center() {
        let m = camera().view_proj();
        let c = m.cols;
        // Clip-space x, y and w of the origin are the translation column.
        let (x, y, w) = (c[3][0], c[3][1], c[3][3]);
        assert!((x / w).abs() < 1e-12);
        assert!((y / w).abs() < 1e-12);
        assert!(w > 0.0);
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let mut cam = camera();
        cam.set_aspect(2.0);
        cam.set_aspect(0.0);
        cam.set_aspect(f64::NAN);
        assert_eq!(cam.aspect, 2.0);
    }
}
