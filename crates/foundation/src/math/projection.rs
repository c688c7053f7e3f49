use super::{Vec2, Vec3};

/// A geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lat_deg: f64,
    pub lng_deg: f64,
}

impl GeoPoint {
    pub fn new(lat_deg: f64, lng_deg: f64) -> Self {
        Self { lat_deg, lng_deg }
    }

    pub fn is_valid(&self) -> bool {
        self.lat_deg.is_finite()
            && self.lng_deg.is_finite()
            && (-90.0..=90.0).contains(&self.lat_deg)
            && (-180.0..=180.0).contains(&self.lng_deg)
    }

    /// Clamps latitude into `[-90, 90]` and wraps longitude into `[-180, 180]`.
    /// Non-finite components collapse to 0.
    pub fn normalized(self) -> Self {
        if self.is_valid() {
            return self;
        }
        let lat = if self.lat_deg.is_finite() {
            self.lat_deg.clamp(-90.0, 90.0)
        } else {
            0.0
        };
        let lng = if self.lng_deg.is_finite() {
            (self.lng_deg + 180.0).rem_euclid(360.0) - 180.0
        } else {
            0.0
        };
        Self::new(lat, lng)
    }
}

/// Projects a geographic position onto a sphere of `radius` centered at the origin.
///
/// Y is up; longitude -180 lies on +X so the texture seam matches a
/// `(lng + 180) / 360` equirectangular image wrapped around the sphere.
pub fn project_to_sphere(lat_deg: f64, lng_deg: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = (lng_deg + 180.0).to_radians();

    let sin_phi = phi.sin();
    Vec3::new(
        radius * sin_phi * theta.cos(),
        radius * phi.cos(),
        radius * sin_phi * theta.sin(),
    )
}

/// Equirectangular placement as fractions of the map image: `u` grows east, `v` grows south.
pub fn project_equirectangular(lat_deg: f64, lng_deg: f64) -> Vec2 {
    Vec2::new((lng_deg + 180.0) / 360.0, (90.0 - lat_deg) / 180.0)
}

#[cfg(test)]
mod tests {
    use super::{GeoPoint, project_equirectangular, project_to_sphere};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn sphere_points_keep_radius() {
        let radius = 2.1;
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lng = -180.0;
            while lng <= 180.0 {
                let p = project_to_sphere(lat, lng, radius);
                assert_close(p.length_squared(), radius * radius, 1e-9);
                lng += 7.5;
            }
            lat += 7.5;
        }
    }

    #[test]
    fn poles_sit_on_y_axis() {
        let north = project_to_sphere(90.0, 12.0, 2.0);
        assert_close(north.x, 0.0, 1e-12);
        assert_close(north.y, 2.0, 1e-12);
        assert_close(north.z, 0.0, 1e-12);

        let south = project_to_sphere(-90.0, -40.0, 2.0);
        assert_close(south.y, -2.0, 1e-12);
    }

    #[test]
    fn antimeridian_maps_to_positive_x() {
        let p = project_to_sphere(0.0, -180.0, 1.0);
        assert_close(p.x, 1.0, 1e-12);
        assert_close(p.z, 0.0, 1e-12);
    }

    #[test]
    fn equirectangular_corners_and_center() {
        assert_eq!(project_equirectangular(90.0, -180.0).x, 0.0);
        assert_eq!(project_equirectangular(90.0, -180.0).y, 0.0);
        let c = project_equirectangular(0.0, 0.0);
        assert_close(c.x, 0.5, 1e-12);
        assert_close(c.y, 0.5, 1e-12);
        let br = project_equirectangular(-90.0, 180.0);
        assert_close(br.x, 1.0, 1e-12);
        assert_close(br.y, 1.0, 1e-12);
    }

    #[test]
    fn normalized_clamps_and_wraps() {
        let p = GeoPoint::new(95.0, 190.0).normalized();
        assert_eq!(p.lat_deg, 90.0);
        assert_close(p.lng_deg, -170.0, 1e-9);
        assert!(p.is_valid());

        let nan = GeoPoint::new(f64::NAN, f64::INFINITY).normalized();
        assert_eq!(nan, GeoPoint::new(0.0, 0.0));

        let ok = GeoPoint::new(40.7128, -74.006);
        assert_eq!(ok.normalized(), ok);
    }
}
