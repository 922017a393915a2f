//! Neighbor lookup and the no-overlap clamp for main tracks.

use serde::{Deserialize, Serialize};

use crate::{ClipId, Ms, TimeRange, TrackSnapshot};

/// How the left/right neighbor of a clip is chosen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NeighborResolution {
    /// Adjacent entries in the track's `clip_order`, whatever their times.
    #[default]
    ListOrder,
    /// Closest clips by time regardless of list position.
    Temporal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Neighbors {
    pub left: Option<TimeRange>,
    pub right: Option<TimeRange>,
}

/// Neighbors by position in `clip_order`. A clip missing from the order has
/// none.
pub fn find_neighbors<F>(clip_order: &[ClipId], clip_id: ClipId, get_clip: F) -> Neighbors
where
    F: Fn(&ClipId) -> Option<TimeRange>,
{
    let Some(idx) = clip_order.iter().position(|id| *id == clip_id) else {
        return Neighbors::default();
    };
    let left = idx
        .checked_sub(1)
        .and_then(|i| clip_order.get(i))
        .and_then(&get_clip);
    let right = clip_order.get(idx + 1).and_then(&get_clip);
    Neighbors { left, right }
}

/// Neighbors by time: the left one is the clip starting before `clip_id`
/// that ends last, the right one the earliest clip starting at or after it.
pub fn find_temporal_neighbors<F>(clip_order: &[ClipId], clip_id: ClipId, get_clip: F) -> Neighbors
where
    F: Fn(&ClipId) -> Option<TimeRange>,
{
    let Some(subject) = get_clip(&clip_id) else {
        return Neighbors::default();
    };
    let mut neighbors = Neighbors::default();
    for range in clip_order
        .iter()
        .filter(|id| **id != clip_id)
        .filter_map(&get_clip)
    {
        if range.start_ms < subject.start_ms {
            if neighbors.left.map_or(true, |l| range.end_ms > l.end_ms) {
                neighbors.left = Some(range);
            }
        } else if neighbors.right.map_or(true, |r| range.start_ms < r.start_ms) {
            neighbors.right = Some(range);
        }
    }
    neighbors
}

impl NeighborResolution {
    pub fn resolve(&self, snapshot: &TrackSnapshot, clip_id: ClipId) -> Neighbors {
        let get_clip = |id: &ClipId| snapshot.range(id);
        match self {
            Self::ListOrder => find_neighbors(&snapshot.clip_order, clip_id, get_clip),
            Self::Temporal => find_temporal_neighbors(&snapshot.clip_order, clip_id, get_clip),
        }
    }
}

/// Clamps a proposed start so a clip of `duration_ms` fits between its
/// neighbors. When they leave no room the clip collapses onto the left bound.
pub fn clamp_to_neighbors(proposed_start: Ms, duration_ms: Ms, neighbors: &Neighbors) -> Ms {
    let lo = neighbors.left.map_or(0.0, |l| l.end_ms).max(0.0);
    let hi = match neighbors.right {
        Some(r) => r.start_ms - duration_ms,
        None => proposed_start.max(lo),
    };
    proposed_start.max(lo).min(lo.max(hi))
}
