use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    GestureContext, Ms, NeighborResolution, SnapConfig, SnapTargets, TimelineError, TimelineGeom,
    DEFAULT_MIN_DURATION_MS,
};

/// Editing preferences, loadable from JSON. Missing fields take defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EditConfig {
    #[serde(default)]
    pub snap: SnapConfig,
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: Ms,
    #[serde(default)]
    pub neighbor_resolution: NeighborResolution,
    #[serde(default = "default_zoom")]
    pub zoom_px_per_second: f64,
}

fn default_min_duration_ms() -> Ms {
    DEFAULT_MIN_DURATION_MS
}

fn default_zoom() -> f64 {
    100.0
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            min_duration_ms: default_min_duration_ms(),
            neighbor_resolution: NeighborResolution::default(),
            zoom_px_per_second: default_zoom(),
        }
    }
}

impl EditConfig {
    pub fn from_json_str(json: &str) -> Result<Self, TimelineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TimelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TimelineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| TimelineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.zoom_px_per_second.is_nan() || self.zoom_px_per_second <= 0.0 {
            return Err(TimelineError::Config(format!(
                "zoom must be positive, got {}",
                self.zoom_px_per_second
            )));
        }
        if self.min_duration_ms < 0.0 || self.snap.threshold_ms < 0.0 {
            return Err(TimelineError::Config(
                "durations and thresholds must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn geometry(&self, scroll_left_px: f64, viewport_left_px: f64) -> TimelineGeom {
        TimelineGeom::from_zoom(self.zoom_px_per_second, scroll_left_px, viewport_left_px)
    }

    pub fn gesture(&self, geom: TimelineGeom, targets: SnapTargets) -> GestureContext {
        GestureContext {
            geom,
            snap: self.snap,
            targets,
            min_duration_ms: self.min_duration_ms,
            neighbor_resolution: self.neighbor_resolution,
        }
    }
}
