//! Drag sessions for moving clips, trimming clip edges and scrubbing the
//! playhead.
//!
//! A session copies everything it needs when the gesture begins and never
//! looks at the project again, so every `update` is a pure function of the
//! session and the pointer position. Proposals are returned to the caller,
//! which decides whether to commit them.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    clamp_to_neighbors, client_x_to_ms, nearest_snap, ClipId, ClipTimes, Ms, NeighborResolution,
    Neighbors, Project, SnapConfig, SnapEdges, SnapKind, SnapTargets, TimeRange, TimelineError,
    TimelineGeom, TrackSnapshot, DEFAULT_MIN_DURATION_MS,
};

/// Inputs shared by every gesture, captured at begin.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureContext {
    pub geom: TimelineGeom,
    pub snap: SnapConfig,
    pub targets: SnapTargets,
    pub min_duration_ms: Ms,
    pub neighbor_resolution: NeighborResolution,
}

impl GestureContext {
    pub fn new(geom: TimelineGeom, snap: SnapConfig, targets: SnapTargets) -> Self {
        Self {
            geom,
            snap,
            targets,
            min_duration_ms: DEFAULT_MIN_DURATION_MS,
            neighbor_resolution: NeighborResolution::default(),
        }
    }

    /// Same gesture with snapping forced off (modifier key held).
    pub fn without_snapping(mut self) -> Self {
        self.snap = self.snap.without_snapping();
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrimEdge {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MoveProposal {
    pub clip_id: ClipId,
    pub range: TimeRange,
    pub snap: Option<SnapKind>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrimProposal {
    pub clip_id: ClipId,
    pub times: ClipTimes,
    pub snap: Option<SnapKind>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScrubProposal {
    pub playhead_ms: Ms,
    pub snap: Option<SnapKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveSession {
    clip_id: ClipId,
    geom: TimelineGeom,
    anchor_ms: Ms,
    snap: SnapConfig,
    edges: SnapEdges,
    targets: SnapTargets,
    neighbors: Neighbors,
    allow_overlap: bool,
    initial: TimeRange,
}

impl MoveSession {
    pub fn begin(
        clip_id: ClipId,
        initial_client_x: f64,
        ctx: &GestureContext,
        track: &TrackSnapshot,
    ) -> Result<Self, TimelineError> {
        let initial = track
            .range(&clip_id)
            .ok_or(TimelineError::ClipNotFound(clip_id))?;
        let session = Self {
            clip_id,
            geom: ctx.geom,
            anchor_ms: client_x_to_ms(initial_client_x, &ctx.geom),
            snap: ctx.snap,
            edges: track.edges_excluding(clip_id),
            targets: ctx.targets.clone(),
            neighbors: ctx.neighbor_resolution.resolve(track, clip_id),
            allow_overlap: track.role.allows_overlap(),
            initial,
        };
        debug!(
            clip = %clip_id,
            start_ms = initial.start_ms,
            end_ms = initial.end_ms,
            allow_overlap = session.allow_overlap,
            "begin move"
        );
        Ok(session)
    }

    pub fn clip_id(&self) -> ClipId {
        self.clip_id
    }

    pub fn duration_ms(&self) -> Ms {
        self.initial.duration_ms()
    }

    pub fn update(&self, client_x: f64) -> MoveProposal {
        self.update_with_geom(client_x, &self.geom)
    }

    /// Like [`update`](Self::update) but against a viewport that scrolled or
    /// zoomed since the gesture began.
    pub fn update_with_geom(&self, client_x: f64, geom: &TimelineGeom) -> MoveProposal {
        let delta_ms = client_x_to_ms(client_x, geom) - self.anchor_ms;
        let proposed = self.initial.start_ms + delta_ms;
        let snapped = nearest_snap(proposed, &self.snap, &self.edges, &self.targets);

        let mut start_ms = snapped.snapped_ms;
        if !self.allow_overlap {
            start_ms = clamp_to_neighbors(start_ms, self.duration_ms(), &self.neighbors);
        }
        let start_ms = start_ms.max(0.0);

        trace!(clip = %self.clip_id, proposed, start_ms, "update move");
        MoveProposal {
            clip_id: self.clip_id,
            range: TimeRange::new(start_ms, start_ms + self.duration_ms()),
            snap: snapped.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrimSession {
    clip_id: ClipId,
    edge: TrimEdge,
    geom: TimelineGeom,
    snap: SnapConfig,
    edges: SnapEdges,
    targets: SnapTargets,
    neighbors: Neighbors,
    allow_overlap: bool,
    initial: ClipTimes,
    min_duration_ms: Ms,
}

impl TrimSession {
    pub fn begin(
        clip_id: ClipId,
        edge: TrimEdge,
        ctx: &GestureContext,
        track: &TrackSnapshot,
    ) -> Result<Self, TimelineError> {
        let clip = track
            .clip(&clip_id)
            .ok_or(TimelineError::ClipNotFound(clip_id))?;
        let session = Self {
            clip_id,
            edge,
            geom: ctx.geom,
            snap: ctx.snap,
            edges: track.edges_excluding(clip_id),
            targets: ctx.targets.clone(),
            neighbors: ctx.neighbor_resolution.resolve(track, clip_id),
            allow_overlap: track.role.allows_overlap(),
            initial: clip.times(),
            min_duration_ms: ctx.min_duration_ms,
        };
        debug!(clip = %clip_id, ?edge, min_duration_ms = ctx.min_duration_ms, "begin trim");
        Ok(session)
    }

    pub fn clip_id(&self) -> ClipId {
        self.clip_id
    }

    pub fn edge(&self) -> TrimEdge {
        self.edge
    }

    pub fn update(&self, client_x: f64) -> TrimProposal {
        self.update_with_geom(client_x, &self.geom)
    }

    pub fn update_with_geom(&self, client_x: f64, geom: &TimelineGeom) -> TrimProposal {
        let raw = client_x_to_ms(client_x, geom);
        let snapped = nearest_snap(raw, &self.snap, &self.edges, &self.targets);
        let initial = self.initial;

        let times = match self.edge {
            TrimEdge::Left => {
                let max_start = initial.end_ms - self.min_duration_ms;
                let left_bound = match (self.allow_overlap, self.neighbors.left) {
                    (false, Some(left)) => left.end_ms,
                    _ => f64::NEG_INFINITY,
                };
                let new_start = snapped.snapped_ms.min(max_start).max(left_bound).max(0.0);
                let delta = new_start - initial.start_ms;
                ClipTimes {
                    start_ms: new_start,
                    in_ms: initial.in_ms + delta,
                    ..initial
                }
            }
            TrimEdge::Right => {
                let min_end = initial.start_ms + self.min_duration_ms;
                let right_bound = match (self.allow_overlap, self.neighbors.right) {
                    (false, Some(right)) => right.start_ms,
                    _ => f64::INFINITY,
                };
                let new_end = snapped.snapped_ms.max(min_end).min(right_bound);
                let delta = new_end - initial.end_ms;
                ClipTimes {
                    end_ms: new_end,
                    out_ms: initial.out_ms + delta,
                    ..initial
                }
            }
        };

        trace!(clip = %self.clip_id, edge = ?self.edge, raw, ?times, "update trim");
        TrimProposal {
            clip_id: self.clip_id,
            times,
            snap: snapped.kind,
        }
    }
}

/// Snaps a pointer position to a playhead time against `edges`, never
/// before the origin.
pub fn scrub_to_ms(
    client_x: f64,
    geom: &TimelineGeom,
    snap: &SnapConfig,
    edges: &SnapEdges,
) -> Ms {
    let raw = client_x_to_ms(client_x, geom);
    nearest_snap(raw, snap, edges, &SnapTargets::default())
        .snapped_ms
        .max(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrubSession {
    geom: TimelineGeom,
    snap: SnapConfig,
    edges: SnapEdges,
    markers: SnapTargets,
}

impl ScrubSession {
    /// `edges` should hold the boundaries of every track. The playhead
    /// itself is never a candidate while it is being dragged.
    pub fn begin(ctx: &GestureContext, edges: SnapEdges) -> Self {
        debug!(edges = edges.len(), "begin scrub");
        Self {
            geom: ctx.geom,
            snap: ctx.snap,
            edges,
            markers: SnapTargets::new(None, ctx.targets.markers.clone()),
        }
    }

    pub fn update(&self, client_x: f64) -> ScrubProposal {
        self.update_with_geom(client_x, &self.geom)
    }

    pub fn update_with_geom(&self, client_x: f64, geom: &TimelineGeom) -> ScrubProposal {
        let raw = client_x_to_ms(client_x, geom);
        let snapped = nearest_snap(raw, &self.snap, &self.edges, &self.markers);
        ScrubProposal {
            playhead_ms: snapped.snapped_ms.max(0.0),
            snap: snapped.kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    Trim(TrimEdge),
    Scrub,
}

/// The one gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSession {
    Move(MoveSession),
    Trim(TrimSession),
    Scrub(ScrubSession),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragProposal {
    Move(MoveProposal),
    Trim(TrimProposal),
    Scrub(ScrubProposal),
}

impl DragSession {
    pub fn kind(&self) -> DragKind {
        match self {
            Self::Move(_) => DragKind::Move,
            Self::Trim(s) => DragKind::Trim(s.edge()),
            Self::Scrub(_) => DragKind::Scrub,
        }
    }

    pub fn update(&self, client_x: f64) -> DragProposal {
        match self {
            Self::Move(s) => DragProposal::Move(s.update(client_x)),
            Self::Trim(s) => DragProposal::Trim(s.update(client_x)),
            Self::Scrub(s) => DragProposal::Scrub(s.update(client_x)),
        }
    }

    pub fn update_with_geom(&self, client_x: f64, geom: &TimelineGeom) -> DragProposal {
        match self {
            Self::Move(s) => DragProposal::Move(s.update_with_geom(client_x, geom)),
            Self::Trim(s) => DragProposal::Trim(s.update_with_geom(client_x, geom)),
            Self::Scrub(s) => DragProposal::Scrub(s.update_with_geom(client_x, geom)),
        }
    }
}

impl From<MoveSession> for DragSession {
    fn from(s: MoveSession) -> Self {
        Self::Move(s)
    }
}

impl From<TrimSession> for DragSession {
    fn from(s: TrimSession) -> Self {
        Self::Trim(s)
    }
}

impl From<ScrubSession> for DragSession {
    fn from(s: ScrubSession) -> Self {
        Self::Scrub(s)
    }
}

impl Project {
    pub fn begin_move(
        &self,
        clip_id: ClipId,
        initial_client_x: f64,
        ctx: &GestureContext,
    ) -> Result<MoveSession, TimelineError> {
        let snapshot = self.track_snapshot(self.clip(clip_id)?.track_id)?;
        MoveSession::begin(clip_id, initial_client_x, ctx, &snapshot)
    }

    pub fn begin_trim(
        &self,
        clip_id: ClipId,
        edge: TrimEdge,
        ctx: &GestureContext,
    ) -> Result<TrimSession, TimelineError> {
        let snapshot = self.track_snapshot(self.clip(clip_id)?.track_id)?;
        TrimSession::begin(clip_id, edge, ctx, &snapshot)
    }

    pub fn begin_scrub(&self, ctx: &GestureContext) -> ScrubSession {
        ScrubSession::begin(ctx, self.all_edges(None))
    }

    /// Writes a drag proposal into the project. Scrub proposals touch no
    /// clip and return `None`.
    pub fn commit(&mut self, proposal: &DragProposal) -> Result<Option<ClipTimes>, TimelineError> {
        match proposal {
            DragProposal::Move(p) => {
                let times = ClipTimes {
                    start_ms: p.range.start_ms,
                    end_ms: p.range.end_ms,
                    ..self.clip(p.clip_id)?.times()
                };
                self.set_clip_times(p.clip_id, times).map(Some)
            }
            DragProposal::Trim(p) => self.set_clip_times(p.clip_id, p.times).map(Some),
            DragProposal::Scrub(_) => Ok(None),
        }
    }
}
