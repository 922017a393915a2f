use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use timeline::{ClipId, DragProposal, DragSession, EditConfig, Ms, Project, TrimEdge};
use tracing::{debug, info};

/// A recorded pointer gesture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Gesture {
    Move {
        clip_id: ClipId,
        start_x: f64,
        pointer: Vec<f64>,
    },
    Trim {
        clip_id: ClipId,
        edge: TrimEdge,
        pointer: Vec<f64>,
    },
    Scrub {
        pointer: Vec<f64>,
    },
}

impl Gesture {
    fn pointer(&self) -> &[f64] {
        match self {
            Gesture::Move { pointer, .. }
            | Gesture::Trim { pointer, .. }
            | Gesture::Scrub { pointer } => pointer,
        }
    }
}

/// Gesture plus the viewport and playhead it was recorded against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureFile {
    pub gesture: Gesture,
    #[serde(default)]
    pub scroll_left_px: f64,
    #[serde(default)]
    pub viewport_left_px: f64,
    #[serde(default)]
    pub playhead_ms: Option<Ms>,
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

/// Runs the gesture through a fresh session and returns every proposal in
/// pointer order.
pub fn replay(
    project: &Project,
    file: &GestureFile,
    config: &EditConfig,
    no_snap: bool,
) -> Result<Vec<DragProposal>> {
    let geom = config.geometry(file.scroll_left_px, file.viewport_left_px);
    let mut ctx = config.gesture(geom, project.markers.snap_targets(file.playhead_ms));
    if no_snap {
        ctx = ctx.without_snapping();
    }

    let session: DragSession = match &file.gesture {
        Gesture::Move {
            clip_id, start_x, ..
        } => project.begin_move(*clip_id, *start_x, &ctx)?.into(),
        Gesture::Trim { clip_id, edge, .. } => project.begin_trim(*clip_id, *edge, &ctx)?.into(),
        Gesture::Scrub { .. } => project.begin_scrub(&ctx).into(),
    };
    info!(kind = ?session.kind(), steps = file.gesture.pointer().len(), "replaying gesture");

    Ok(file
        .gesture
        .pointer()
        .iter()
        .map(|x| {
            let proposal = session.update(*x);
            debug!(x, ?proposal, "pointer move");
            proposal
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline::{Clip, TrackRole};

    #[test]
    fn replays_move_with_and_without_snap() {
        let mut project = Project::new();
        let track = project.add_track(TrackRole::Main, "V1");
        let clip = Clip::new(track, "a.mp4", 1000.0, 2000.0, 0.0);
        let clip_id = clip.id;
        project.insert_clip(clip, None).unwrap();

        // default zoom is 100 px/s, so 3 px is 30 ms
        let file = GestureFile {
            gesture: Gesture::Move {
                clip_id,
                start_x: 100.0,
                pointer: vec![103.0],
            },
            scroll_left_px: 0.0,
            viewport_left_px: 0.0,
            playhead_ms: None,
        };
        let config = EditConfig::default();

        let snapped = replay(&project, &file, &config, false).unwrap();
        let DragProposal::Move(p) = snapped[0] else {
            panic!("expected a move proposal");
        };
        assert_eq!(p.range.start_ms, 1000.0);

        let free = replay(&project, &file, &config, true).unwrap();
        let DragProposal::Move(p) = free[0] else {
            panic!("expected a move proposal");
        };
        assert!((p.range.start_ms - 1030.0).abs() < 1e-6);
    }

    #[test]
    fn gesture_file_parses() {
        let json = r#"{
            "gesture": { "kind": "scrub", "pointer": [10.0, 20.0] },
            "playhead_ms": 500.0
        }"#;
        let file: GestureFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.gesture.pointer(), &[10.0, 20.0]);
        assert_eq!(file.scroll_left_px, 0.0);
    }
}
