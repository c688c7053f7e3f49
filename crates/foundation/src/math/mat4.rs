use super::Vec3;

/// Column-major 4x4 matrix (`cols[col][row]`), matching WGSL's `mat4x4<f32>` layout.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f64; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [t.x, t.y, t.z, 1.0];
        m
    }

    pub fn scale(s: Vec3) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[0][0] = s.x;
        m.cols[1][1] = s.y;
        m.cols[2][2] = s.z;
        m
    }

    pub fn rotation_x(angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        let mut m = Self::IDENTITY;
        m.cols[1] = [0.0, c, s, 0.0];
        m.cols[2] = [0.0, -s, c, 0.0];
        m
    }

    pub fn rotation_y(angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        let mut m = Self::IDENTITY;
        m.cols[0] = [c, 0.0, -s, 0.0];
        m.cols[2] = [s, 0.0, c, 0.0];
        m
    }

    pub fn rotation_z(angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        let mut m = Self::IDENTITY;
        m.cols[0] = [c, s, 0.0, 0.0];
        m.cols[1] = [-s, c, 0.0, 0.0];
        m
    }

    /// Euler rotation applied in X, then Y, then Z intrinsic order (`Rx * Ry * Rz`).
    pub fn rotation_xyz(euler_rad: Vec3) -> Self {
        Self::rotation_x(euler_rad.x)
            .mul(&Self::rotation_y(euler_rad.y))
            .mul(&Self::rotation_z(euler_rad.z))
    }

    /// `translation * rotation * scale`.
    pub fn from_trs(translation: Vec3, euler_rad: Vec3, scale: Vec3) -> Self {
        Self::translation(translation)
            .mul(&Self::rotation_xyz(euler_rad))
            .mul(&Self::scale(scale))
    }

    pub fn mul(&self, b: &Self) -> Self {
        // Column-major matrix multiply: c = a * b
        let a = &self.cols;
        let mut c = [[0.0f64; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                c[col][row] = a[0][row] * b.cols[col][0]
                    + a[1][row] * b.cols[col][1]
                    + a[2][row] * b.cols[col][2]
                    + a[3][row] * b.cols[col][3];
            }
        }
        Self { cols: c }
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.cols;
        let w = m[0][3] * p.x + m[1][3] * p.y + m[2][3] * p.z + m[3][3];
        let w = if w.abs() <= f64::EPSILON { 1.0 } else { w };
        Vec3::new(
            (m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0]) / w,
            (m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1]) / w,
            (m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2]) / w,
        )
    }

    /// Right-handed perspective with depth range `[0, 1]`.
    pub fn perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (0.5 * fov_y_rad).tan();
        let aspect = aspect.max(1e-6);
        Self {
            cols: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, far / (near - far), -1.0],
                [0.0, 0.0, (near * far) / (near - far), 0.0],
            ],
        }
    }

    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);

        Self {
            cols: [
                [s.x, u.x, -f.x, 0.0],
                [s.y, u.y, -f.y, 0.0],
                [s.z, u.z, -f.z, 0.0],
                [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
            ],
        }
    }

    pub fn to_f32_cols(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0f32; 4]; 4];
        for (dst, src) in out.iter_mut().zip(self.cols.iter()) {
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d = *s as f32;
            }
        }
        out
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::Mat4;
    use crate::math::Vec3;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        let d = (a - b).length();
        assert!(d < 1e-9, "expected {a:?} ~= {b:?}");
    }

    #[test]
    fn trs_applies_scale_then_rotation_then_translation() {
        let m = Mat4::from_trs(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, std::f64::consts::FRAC_PI_2, 0.0),
            Vec3::splat(2.0),
        );
        // +X scaled to 2, rotated about Y onto -Z, then shifted by +1 on X.
        assert_vec_close(m.transform_point(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn look_at_maps_target_in_front_of_camera() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert_vec_close(view.transform_point(Vec3::ZERO), Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn identity_is_neutral() {
        let m = Mat4::rotation_x(0.3);
        assert_eq!(m.mul(&Mat4::IDENTITY), m);
    }
}
