use foundation::color::Rgb;
use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};

/// One geolocated donation. One marker is drawn per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub amount: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor: Option<String>,
}

impl DonationPoint {
    pub fn new(latitude: f64, longitude: f64, amount: f64, category: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            amount,
            category: category.into(),
            donor: None,
        }
    }

    /// Position with latitude clamped and longitude wrapped.
    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude).normalized()
    }
}

/// Ground position of a funds-map bar.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundsDistribution {
    pub label: String,
    pub amount: f64,
    pub color: Rgb,
    pub anchor: Anchor,
}

/// Amount usable for sizing; negative, NaN and infinite values count as zero.
pub fn sanitized_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{DonationPoint, FundsDistribution, sanitized_amount};
    use foundation::color::Rgb;
    use pretty_assertions::assert_eq;

    #[test]
    fn donation_point_parses_without_donor() {
        let json = r#"{"latitude":40.7,"longitude":-74.0,"amount":500,"category":"Education"}"#;
        let p: DonationPoint = serde_json::from_str(json).expect("parse");
        assert_eq!(p, DonationPoint::new(40.7, -74.0, 500.0, "Education"));
    }

    #[test]
    fn distribution_color_is_css_hex() {
        let json = r##"{"label":"Water","amount":12.5,"color":"#00BCD4","anchor":{"x":-2.0,"z":1.0}}"##;
        let d: FundsDistribution = serde_json::from_str(json).expect("parse");
        assert_eq!(d.color, Rgb::from_hex(0x00bcd4));
        assert_eq!(d.anchor.x, -2.0);
    }

    #[test]
    fn degenerate_amounts_count_as_zero() {
        assert_eq!(sanitized_amount(-5.0), 0.0);
        assert_eq!(sanitized_amount(f64::NAN), 0.0);
        assert_eq!(sanitized_amount(f64::INFINITY), 0.0);
        assert_eq!(sanitized_amount(7.5), 7.5);
    }

    #[test]
    fn out_of_range_point_is_normalized() {
        let p = DonationPoint::new(95.0, 190.0, 1.0, "other").geo();
        assert_eq!(p.lat_deg, 90.0);
        assert!((p.lng_deg - -170.0).abs() < 1e-9);
    }
}
