//! Timeline markers. Their positions are snap candidates while editing.

use crate::{Ms, SnapTargets};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use uuid::Uuid;

/// Marker ID
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MarkerId(pub Uuid);

impl MarkerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MarkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    #[default]
    Standard,

    /// Edit range start
    In,

    /// Edit range end
    Out,

    /// Chapter marker (for export)
    Chapter,

    Comment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub ms: Ms,
    pub label: String,
    #[serde(default)]
    pub kind: MarkerKind,

    /// Color in hex format (e.g., "#FF0000")
    #[serde(default = "default_marker_color")]
    pub color: String,

    #[serde(default)]
    pub note: String,

    /// Unix timestamp, seconds
    #[serde(default)]
    pub created_at: i64,
}

fn default_marker_color() -> String {
    "#4A9EFF".to_string() // Blue
}

impl Marker {
    pub fn new(ms: Ms, label: impl Into<String>) -> Self {
        Self {
            id: MarkerId::new(),
            ms,
            label: label.into(),
            kind: MarkerKind::Standard,
            color: default_marker_color(),
            note: String::new(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_kind(mut self, kind: MarkerKind) -> Self {
        self.kind = kind;
        self.color = match kind {
            MarkerKind::In => "#00FF00".to_string(),
            MarkerKind::Out => "#FF0000".to_string(),
            MarkerKind::Chapter => "#FF00FF".to_string(),
            MarkerKind::Comment => "#FFFF00".to_string(),
            MarkerKind::Standard => default_marker_color(),
        };
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerCollection {
    markers: HashMap<MarkerId, Marker>,
}

impl MarkerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, marker: Marker) -> MarkerId {
        let id = marker.id;
        self.markers.insert(id, marker);
        id
    }

    pub fn remove(&mut self, id: &MarkerId) -> Option<Marker> {
        self.markers.remove(id)
    }

    pub fn get(&self, id: &MarkerId) -> Option<&Marker> {
        self.markers.get(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Marker positions in ascending order.
    pub fn sorted_positions(&self) -> Vec<Ms> {
        let mut positions: Vec<Ms> = self.markers.values().map(|m| m.ms).collect();
        positions.sort_by(|a, b| a.total_cmp(b));
        positions
    }

    pub fn nearest(&self, ms: Ms) -> Option<&Marker> {
        self.markers
            .values()
            .min_by(|a, b| (a.ms - ms).abs().total_cmp(&(b.ms - ms).abs()))
    }

    /// Snap candidates for a gesture: every marker plus the playhead.
    pub fn snap_targets(&self, playhead_ms: Option<Ms>) -> SnapTargets {
        SnapTargets::new(playhead_ms, self.sorted_positions())
    }

    pub fn in_out_range(&self) -> Option<(Ms, Ms)> {
        let in_ms = self.markers.values().find(|m| m.kind == MarkerKind::In)?.ms;
        let out_ms = self.markers.values().find(|m| m.kind == MarkerKind::Out)?.ms;
        Some((in_ms, out_ms))
    }

    /// Replaces any existing In marker.
    pub fn set_in_point(&mut self, ms: Ms) -> MarkerId {
        self.markers.retain(|_, m| m.kind != MarkerKind::In);
        self.add(Marker::new(ms, "In").with_kind(MarkerKind::In))
    }

    /// Replaces any existing Out marker.
    pub fn set_out_point(&mut self, ms: Ms) -> MarkerId {
        self.markers.retain(|_, m| m.kind != MarkerKind::Out);
        self.add(Marker::new(ms, "Out").with_kind(MarkerKind::Out))
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}
