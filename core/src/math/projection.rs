//! Web-mercator math used to place markers on the tactical canvas.

use crate::model::GeoPoint;
use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

pub struct WebMercator;

impl WebMercator {
    /// World pixel coordinates of `point` at `zoom`.
    pub fn to_world(point: GeoPoint, zoom: f64) -> (f64, f64) {
        let scale = TILE_SIZE * 2f64.powf(zoom);
        let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (point.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * scale;
        (x, y)
    }

    /// Slippy-map tile index containing `point`.
    pub fn tile_of(point: GeoPoint, zoom: u8) -> (u32, u32) {
        let (x, y) = Self::to_world(point, f64::from(zoom));
        let max_index = 1u32
            .checked_shl(u32::from(zoom))
            .map_or(u32::MAX, |tiles| tiles - 1);
        let tx = (x / TILE_SIZE).floor().max(0.0) as u32;
        let ty = (y / TILE_SIZE).floor().max(0.0) as u32;
        (tx.min(max_index), ty.min(max_index))
    }
}

/// Visible map window: a center and a zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center: GeoPoint, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Screen position of `point` on a `width` x `height` surface.
    pub fn project(&self, point: GeoPoint, width: f64, height: f64) -> (f64, f64) {
        let (cx, cy) = WebMercator::to_world(self.center, self.zoom);
        let (px, py) = WebMercator::to_world(point, self.zoom);
        (px - cx + width / 2.0, py - cy + height / 2.0)
    }

    /// Linear blend toward `target`, `t` in `[0, 1]`.
    pub fn lerp(&self, target: &Viewport, t: f64) -> Viewport {
        let t = t.clamp(0.0, 1.0);
        Viewport {
            center: GeoPoint::new(
                self.center.lat + (target.center.lat - self.center.lat) * t,
                self.center.lng + (target.center.lng - self.center.lng) * t,
            ),
            zoom: self.zoom + (target.zoom - self.zoom) * t,
        }
    }
}
