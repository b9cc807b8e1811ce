use serde::{Deserialize, Serialize};

/// Latitude / longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Coordinates as shown in the incident detail panel.
    pub fn display(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rounds_to_four_decimals() {
        let point = GeoPoint::new(34.052_234, -118.243_685);
        assert_eq!(point.display(), "34.0522, -118.2437");
    }
}
