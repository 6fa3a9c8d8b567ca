//! Spherical Web-Mercator projection.
//!
//! Pixel space follows the vector-tile convention used by hosted map styles:
//! at zoom `z` the whole world is `TILE_SIZE * 2^z` pixels wide, `x` grows
//! east and `y` grows south.

use crate::lnglat::LngLat;

/// Tile edge length in pixels for vector map styles.
pub const TILE_SIZE: f64 = 512.0;
/// Latitude limit of the square Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: ScreenPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Projects a coordinate into world pixels at `zoom`.
pub fn project(c: LngLat, zoom: f64) -> ScreenPoint {
    let size = world_size(zoom);
    let lat = c.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (c.lng + 180.0) / 360.0 * size;
    let merc = (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
    let y = (0.5 - merc / (2.0 * std::f64::consts::PI)) * size;
    ScreenPoint::new(x, y)
}

/// Projects `c` into a viewport of `width` x `height` pixels centered on `center`.
pub fn to_screen(c: LngLat, center: LngLat, zoom: f64, width: f64, height: f64) -> ScreenPoint {
    let p = project(c, zoom);
    let o = project(center, zoom);
    ScreenPoint::new(p.x - o.x + width / 2.0, p.y - o.y + height / 2.0)
}

#[cfg(test)]
mod tests {
    use super::{LngLat, ScreenPoint, TILE_SIZE, project, to_screen, world_size};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn origin_projects_to_world_center() {
        let p = project(LngLat::new(0.0, 0.0), 0.0);
        assert_close(p.x, TILE_SIZE / 2.0, 1e-9);
        assert_close(p.y, TILE_SIZE / 2.0, 1e-9);
    }

    #[test]
    fn each_zoom_level_doubles_pixel_distances() {
        let a = LngLat::new(-87.6369, 41.8884);
        let b = LngLat::new(-87.6475, 41.8827);
        let d = |z: f64| project(a, z).distance_sq(project(b, z)).sqrt();
        assert_close(d(12.6) / d(11.6), 2.0, 1e-9);
        assert_close(world_size(1.0), 2.0 * TILE_SIZE, 1e-9);
    }

    #[test]
    fn center_lands_mid_viewport_and_north_is_up() {
        let center = LngLat::new(-87.6298, 41.8781);
        let mid = to_screen(center, center, 11.6, 400.0, 800.0);
        assert_eq!(mid, ScreenPoint::new(200.0, 400.0));

        let north = to_screen(LngLat::new(-87.6298, 41.9), center, 11.6, 400.0, 800.0);
        assert!(north.y < mid.y);
        let east = to_screen(LngLat::new(-87.6, 41.8781), center, 11.6, 400.0, 800.0);
        assert!(east.x > mid.x);
    }
}
