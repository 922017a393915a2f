use serde::{Deserialize, Serialize};

use crate::{Ms, TimeRange};

/// Snapping configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SnapConfig {
    /// Enable snapping
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum distance a value may be pulled
    #[serde(default = "default_threshold_ms")]
    pub threshold_ms: Ms,

    /// Grid spacing
    #[serde(default = "default_grid_ms")]
    pub grid_ms: Ms,
}

fn default_enabled() -> bool {
    true
}

fn default_threshold_ms() -> Ms {
    80.0
}

fn default_grid_ms() -> Ms {
    100.0
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            threshold_ms: default_threshold_ms(),
            grid_ms: default_grid_ms(),
        }
    }
}

impl SnapConfig {
    /// Copy with snapping switched off, for a gesture made with the
    /// snap-override modifier held.
    pub fn without_snapping(&self) -> Self {
        Self {
            enabled: false,
            ..*self
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

/// What a snapped value was pulled to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SnapKind {
    Grid,
    Edge,
    Playhead,
    Marker,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SnapResult {
    pub snapped_ms: Ms,
    pub kind: Option<SnapKind>,
}

impl SnapResult {
    fn unsnapped(value_ms: Ms) -> Self {
        Self {
            snapped_ms: value_ms,
            kind: None,
        }
    }
}

/// Sorted, de-duplicated clip boundaries. Always contains the origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "Vec<Ms>", into = "Vec<Ms>")]
pub struct SnapEdges(Vec<Ms>);

impl From<Vec<Ms>> for SnapEdges {
    fn from(points: Vec<Ms>) -> Self {
        Self::from_points(points)
    }
}

impl From<SnapEdges> for Vec<Ms> {
    fn from(edges: SnapEdges) -> Self {
        edges.0
    }
}

impl Default for SnapEdges {
    fn default() -> Self {
        Self(vec![0.0])
    }
}

impl SnapEdges {
    pub fn from_points(points: impl IntoIterator<Item = Ms>) -> Self {
        let mut edges: Vec<Ms> = std::iter::once(0.0).chain(points).collect();
        edges.sort_by(|a, b| a.total_cmp(b));
        edges.dedup();
        Self(edges)
    }

    pub fn from_ranges(ranges: impl IntoIterator<Item = TimeRange>) -> Self {
        Self::from_points(
            ranges
                .into_iter()
                .flat_map(|r| [r.start_ms, r.end_ms]),
        )
    }

    pub fn as_slice(&self) -> &[Ms] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The at most two edges bracketing `value_ms`, lower first.
    fn bracketing(&self, value_ms: Ms) -> impl Iterator<Item = Ms> + '_ {
        let idx = self.0.partition_point(|e| *e < value_ms);
        let lower = idx.checked_sub(1).map(|i| self.0[i]);
        let upper = self.0.get(idx).copied();
        lower.into_iter().chain(upper)
    }
}

/// Candidates that move during editing: the playhead and markers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SnapTargets {
    #[serde(default)]
    pub playhead_ms: Option<Ms>,
    #[serde(default)]
    pub markers: Vec<Ms>,
}

impl SnapTargets {
    pub fn new(playhead_ms: Option<Ms>, markers: Vec<Ms>) -> Self {
        Self {
            playhead_ms,
            markers,
        }
    }

    pub fn playhead(playhead_ms: Ms) -> Self {
        Self::new(Some(playhead_ms), Vec::new())
    }
}

/// Nearest grid line, rounding halves upward.
pub fn grid_point(value_ms: Ms, grid_ms: Ms) -> Ms {
    (value_ms / grid_ms + 0.5).floor() * grid_ms
}

/// Pulls `value_ms` to the closest candidate within the threshold.
///
/// Candidates are scanned grid, edges, playhead, markers, and a later one
/// only wins with a strictly smaller distance, so on a tie the earlier kind
/// is kept.
pub fn nearest_snap(
    value_ms: Ms,
    config: &SnapConfig,
    edges: &SnapEdges,
    targets: &SnapTargets,
) -> SnapResult {
    if !config.enabled {
        return SnapResult::unsnapped(value_ms);
    }

    let grid = (config.grid_ms > 0.0).then(|| grid_point(value_ms, config.grid_ms));
    let candidates = grid
        .into_iter()
        .map(|ms| (ms, SnapKind::Grid))
        .chain(edges.bracketing(value_ms).map(|ms| (ms, SnapKind::Edge)))
        .chain(targets.playhead_ms.map(|ms| (ms, SnapKind::Playhead)))
        .chain(targets.markers.iter().map(|ms| (*ms, SnapKind::Marker)));

    let mut best: Option<(Ms, SnapKind)> = None;
    let mut best_dist = f64::INFINITY;
    for (candidate, kind) in candidates {
        let dist = (candidate - value_ms).abs();
        if dist < best_dist && dist <= config.threshold_ms {
            best = Some((candidate, kind));
            best_dist = dist;
        }
    }

    match best {
        Some((snapped_ms, kind)) => SnapResult {
            snapped_ms,
            kind: Some(kind),
        },
        None => SnapResult::unsnapped(value_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold_ms: Ms, grid_ms: Ms) -> SnapConfig {
        SnapConfig {
            enabled: true,
            threshold_ms,
            grid_ms,
        }
    }

    #[test]
    fn disabled_returns_value_untouched() {
        let cfg = config(80.0, 100.0).without_snapping();
        let result = nearest_snap(1030.0, &cfg, &SnapEdges::default(), &SnapTargets::default());
        assert_eq!(result.snapped_ms, 1030.0);
        assert_eq!(result.kind, None);
    }

    #[test]
    fn grid_wins_tie_against_edge() {
        // 1050 rounds to grid 1100 and sits 50 from both it and the edge at 1000.
        let edges = SnapEdges::from_points([1000.0]);
        let result = nearest_snap(1050.0, &config(80.0, 100.0), &edges, &SnapTargets::default());
        assert_eq!(result.kind, Some(SnapKind::Grid));
        assert_eq!(result.snapped_ms, 1100.0);

        let edges = SnapEdges::from_points([1010.0]);
        let result = nearest_snap(1040.0, &config(80.0, 60.0), &edges, &SnapTargets::default());
        // grid point 1020 and edge 1010: grid is closer (20 vs 30)
        assert_eq!(result.kind, Some(SnapKind::Grid));
        assert_eq!(result.snapped_ms, 1020.0);
    }

    #[test]
    fn edge_beats_playhead_at_equal_distance() {
        let edges = SnapEdges::from_points([2000.0]);
        let targets = SnapTargets::playhead(2040.0);
        // a 10s grid lands far away
        let result = nearest_snap(2020.0, &config(30.0, 10_000.0), &edges, &targets);
        assert_eq!(result.kind, Some(SnapKind::Edge));
        assert_eq!(result.snapped_ms, 2000.0);
    }

    #[test]
    fn marker_only_wins_when_strictly_closer() {
        let targets = SnapTargets::new(Some(500.0), vec![520.0, 509.0]);
        let result = nearest_snap(510.0, &config(30.0, 0.0), &SnapEdges::default(), &targets);
        assert_eq!(result.kind, Some(SnapKind::Marker));
        assert_eq!(result.snapped_ms, 509.0);
    }

    #[test]
    fn nothing_in_threshold_is_no_snap() {
        let edges = SnapEdges::from_points([5000.0]);
        let result = nearest_snap(1234.0, &config(10.0, 100.0), &edges, &SnapTargets::default());
        assert_eq!(result.snapped_ms, 1234.0);
        assert_eq!(result.kind, None);
    }

    #[test]
    fn snapping_is_idempotent() {
        let edges = SnapEdges::from_points([330.0, 1275.0, 4000.0]);
        let targets = SnapTargets::new(Some(2222.0), vec![3100.0]);
        let cfg = config(80.0, 250.0);
        for raw in [0.0, 17.0, 300.0, 1260.0, 2190.0, 3050.0, 3999.0, 7777.0] {
            let once = nearest_snap(raw, &cfg, &edges, &targets);
            let twice = nearest_snap(once.snapped_ms, &cfg, &edges, &targets);
            assert_eq!(once.snapped_ms, twice.snapped_ms, "raw {raw}");
        }
    }

    #[test]
    fn edges_are_sorted_and_deduplicated() {
        let edges = SnapEdges::from_ranges([
            TimeRange::new(3000.0, 4000.0),
            TimeRange::new(1000.0, 3000.0),
        ]);
        assert_eq!(edges.as_slice(), &[0.0, 1000.0, 3000.0, 4000.0]);
    }

    #[test]
    fn deserialized_edges_are_normalized() {
        let edges: SnapEdges = serde_json::from_str("[3000.0, 1000.0, 3000.0]").unwrap();
        assert_eq!(edges.as_slice(), &[0.0, 1000.0, 3000.0]);
        assert_eq!(serde_json::to_string(&edges).unwrap(), "[0.0,1000.0,3000.0]");

        let result = nearest_snap(1020.0, &config(80.0, 0.0), &edges, &SnapTargets::default());
        assert_eq!(result.snapped_ms, 1000.0);
        assert_eq!(result.kind, Some(SnapKind::Edge));
    }

    #[test]
    fn grid_rounds_halves_up() {
        assert_eq!(grid_point(150.0, 100.0), 200.0);
        assert_eq!(grid_point(-150.0, 100.0), -100.0);
        assert_eq!(grid_point(149.0, 100.0), 100.0);
    }
}
