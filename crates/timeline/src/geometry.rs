//! Mapping between pointer pixels and timeline milliseconds.
//!
//! `px_per_ms` must be positive; the zoom control upstream guarantees it and
//! nothing here checks.

use serde::{Deserialize, Serialize};

use crate::Ms;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimelineGeom {
    pub px_per_ms: f64,
    pub scroll_left_px: f64,
    pub viewport_left_px: f64,
}

impl TimelineGeom {
    pub fn new(px_per_ms: f64, scroll_left_px: f64, viewport_left_px: f64) -> Self {
        Self {
            px_per_ms,
            scroll_left_px,
            viewport_left_px,
        }
    }

    /// Builds the geometry from a zoom expressed in pixels per second.
    pub fn from_zoom(px_per_second: f64, scroll_left_px: f64, viewport_left_px: f64) -> Self {
        Self::new(px_per_second / 1000.0, scroll_left_px, viewport_left_px)
    }

    /// Timeline interval currently visible in a viewport `width_px` wide.
    pub fn visible_range_ms(&self, width_px: f64) -> (Ms, Ms) {
        let start = px_to_ms(self.scroll_left_px, self);
        (start, start + px_to_ms(width_px, self))
    }
}

pub fn ms_to_px(ms: Ms, geom: &TimelineGeom) -> f64 {
    ms * geom.px_per_ms
}

pub fn px_to_ms(px: f64, geom: &TimelineGeom) -> Ms {
    px / geom.px_per_ms
}

pub fn client_x_to_ms(client_x: f64, geom: &TimelineGeom) -> Ms {
    px_to_ms((client_x - geom.viewport_left_px) + geom.scroll_left_px, geom)
}

/// Inverse of [`client_x_to_ms`].
pub fn ms_to_client_x(ms: Ms, geom: &TimelineGeom) -> f64 {
    ms_to_px(ms, geom) - geom.scroll_left_px + geom.viewport_left_px
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * a.abs().max(1.0)
    }

    #[test]
    fn px_round_trip() {
        let geoms = [
            TimelineGeom::new(0.1, 0.0, 0.0),
            TimelineGeom::new(0.037, 120.0, 48.0),
            TimelineGeom::from_zoom(250.0, 5000.0, 200.0),
        ];
        for geom in &geoms {
            for ms in [0.0, 1.0, 33.3, 1000.0, 123_456.789] {
                assert!(close(px_to_ms(ms_to_px(ms, geom), geom), ms));
            }
        }
    }

    #[test]
    fn client_x_accounts_for_scroll_and_viewport() {
        let geom = TimelineGeom::new(0.5, 100.0, 40.0);
        // (140 - 40 + 100) / 0.5
        assert_eq!(client_x_to_ms(140.0, &geom), 400.0);
        assert_eq!(ms_to_client_x(400.0, &geom), 140.0);
    }

    #[test]
    fn zoom_is_pixels_per_second() {
        let geom = TimelineGeom::from_zoom(100.0, 0.0, 0.0);
        assert!(close(geom.px_per_ms, 0.1));
        let (start, end) = TimelineGeom::from_zoom(100.0, 200.0, 0.0).visible_range_ms(1000.0);
        assert!(close(start, 2000.0));
        assert!(close(end, 12_000.0));
    }
}
