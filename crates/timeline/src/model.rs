use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt,
};
use uuid::Uuid;

use crate::{markers::MarkerCollection, Ms, SnapEdges, TimelineError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ClipId(pub Uuid);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TrackId(pub Uuid);

impl TrackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open interval `[start_ms, end_ms)` on the timeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeRange {
    pub start_ms: Ms,
    pub end_ms: Ms,
}

impl TimeRange {
    pub fn new(start_ms: Ms, end_ms: Ms) -> Self {
        Self { start_ms, end_ms }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end_ms - self.start_ms
    }

    /// True only for points strictly between the two edges.
    pub fn contains_strict(&self, ms: Ms) -> bool {
        self.start_ms < ms && ms < self.end_ms
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }
}

/// Timeline placement plus source-media offsets of a clip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClipTimes {
    pub start_ms: Ms,
    pub end_ms: Ms,
    pub in_ms: Ms,
    pub out_ms: Ms,
}

impl ClipTimes {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_ms, self.end_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub id: ClipId,
    pub track_id: TrackId,
    pub asset_id: String,
    pub start_ms: Ms,
    pub end_ms: Ms,
    pub in_ms: Ms,
    pub out_ms: Ms,
}

impl Clip {
    /// Creates a clip whose source window starts at `in_ms` and is as long as
    /// its timeline interval.
    pub fn new(
        track_id: TrackId,
        asset_id: impl Into<String>,
        start_ms: Ms,
        end_ms: Ms,
        in_ms: Ms,
    ) -> Self {
        Self {
            id: ClipId::new(),
            track_id,
            asset_id: asset_id.into(),
            start_ms,
            end_ms,
            in_ms,
            out_ms: in_ms + (end_ms - start_ms),
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_ms, self.end_ms)
    }

    pub fn duration_ms(&self) -> Ms {
        self.end_ms - self.start_ms
    }

    pub fn times(&self) -> ClipTimes {
        ClipTimes {
            start_ms: self.start_ms,
            end_ms: self.end_ms,
            in_ms: self.in_ms,
            out_ms: self.out_ms,
        }
    }

    pub fn set_times(&mut self, times: ClipTimes) {
        self.start_ms = times.start_ms;
        self.end_ms = times.end_ms;
        self.in_ms = times.in_ms;
        self.out_ms = times.out_ms;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackRole {
    /// Clips may not overlap.
    #[default]
    Main,
    /// Clips may overlap, e.g. picture-in-picture.
    Overlay,
}

impl TrackRole {
    pub fn allows_overlap(&self) -> bool {
        matches!(self, Self::Overlay)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub role: TrackRole,
    /// Explicit clip order. Not guaranteed to be sorted by start time.
    #[serde(default)]
    pub clip_order: Vec<ClipId>,
}

impl Track {
    pub fn new(name: impl Into<String>, role: TrackRole) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            role,
            clip_order: Vec::new(),
        }
    }
}

/// Owned copy of one track taken at gesture start.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSnapshot {
    pub track_id: TrackId,
    pub role: TrackRole,
    pub clip_order: Vec<ClipId>,
    pub clips: HashMap<ClipId, Clip>,
}

impl TrackSnapshot {
    pub fn clip(&self, id: &ClipId) -> Option<&Clip> {
        self.clips.get(id)
    }

    pub fn range(&self, id: &ClipId) -> Option<TimeRange> {
        self.clips.get(id).map(Clip::range)
    }

    /// Boundaries of every clip on the track except `exclude`, plus the origin.
    pub fn edges_excluding(&self, exclude: ClipId) -> SnapEdges {
        SnapEdges::from_ranges(
            self.clip_order
                .iter()
                .filter(|id| **id != exclude)
                .filter_map(|id| self.range(id)),
        )
    }
}

/// Arena of tracks and clips keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Project {
    #[serde(default)]
    pub track_order: Vec<TrackId>,
    #[serde(default)]
    pub tracks: HashMap<TrackId, Track>,
    #[serde(default)]
    pub clips: HashMap<ClipId, Clip>,
    #[serde(default)]
    pub markers: MarkerCollection,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_track(&mut self, role: TrackRole, name: impl Into<String>) -> TrackId {
        let track = Track::new(name, role);
        let id = track.id;
        self.track_order.push(id);
        self.tracks.insert(id, track);
        id
    }

    /// Inserts a track together with the clips it lists in `clip_order`.
    pub fn insert_track(
        &mut self,
        track: Track,
        clips: Vec<Clip>,
        index: usize,
    ) -> Result<(), TimelineError> {
        if self.tracks.contains_key(&track.id) {
            return Err(TimelineError::TrackExists(track.id));
        }
        if index > self.track_order.len() {
            return Err(TimelineError::InvalidOp(format!(
                "track index {} out of bounds",
                index
            )));
        }
        let mut seen = HashSet::new();
        for clip in &clips {
            if self.clips.contains_key(&clip.id) || !seen.insert(clip.id) {
                return Err(TimelineError::ClipExists(clip.id));
            }
            if clip.track_id != track.id {
                return Err(TimelineError::InvalidOp(format!(
                    "clip {} belongs to track {}, not {}",
                    clip.id, clip.track_id, track.id
                )));
            }
        }
        let order: HashSet<ClipId> = track.clip_order.iter().copied().collect();
        if order.len() != track.clip_order.len() || order != seen
        {
            return Err(TimelineError::InvalidOp(format!(
                "clips do not match the clip order of track {}",
                track.id
            )));
        }
        self.track_order.insert(index, track.id);
        for clip in clips {
            self.clips.insert(clip.id, clip);
        }
        self.tracks.insert(track.id, track);
        Ok(())
    }

    /// Removes a track and all of its clips.
    pub fn remove_track(
        &mut self,
        track_id: TrackId,
    ) -> Result<(Track, Vec<Clip>, usize), TimelineError> {
        let index = self
            .track_order
            .iter()
            .position(|id| *id == track_id)
            .ok_or(TimelineError::TrackNotFound(track_id))?;
        self.track_order.remove(index);
        let track = self
            .tracks
            .remove(&track_id)
            .ok_or(TimelineError::TrackNotFound(track_id))?;
        let clips = track
            .clip_order
            .iter()
            .filter_map(|id| self.clips.remove(id))
            .collect();
        Ok((track, clips, index))
    }

    pub fn track(&self, id: TrackId) -> Result<&Track, TimelineError> {
        self.tracks.get(&id).ok_or(TimelineError::TrackNotFound(id))
    }

    fn track_mut(&mut self, id: TrackId) -> Result<&mut Track, TimelineError> {
        self.tracks
            .get_mut(&id)
            .ok_or(TimelineError::TrackNotFound(id))
    }

    pub fn clip(&self, id: ClipId) -> Result<&Clip, TimelineError> {
        self.clips.get(&id).ok_or(TimelineError::ClipNotFound(id))
    }

    pub fn track_of(&self, clip_id: ClipId) -> Result<&Track, TimelineError> {
        let clip = self.clip(clip_id)?;
        self.track(clip.track_id)
    }

    /// Tracks in display order.
    pub fn ordered_tracks(&self) -> impl Iterator<Item = &Track> {
        self.track_order.iter().filter_map(|id| self.tracks.get(id))
    }

    pub fn insert_clip(&mut self, clip: Clip, position: Option<usize>) -> Result<(), TimelineError> {
        if self.clips.contains_key(&clip.id) {
            return Err(TimelineError::ClipExists(clip.id));
        }
        if clip.end_ms <= clip.start_ms {
            return Err(TimelineError::InvalidOp(format!(
                "clip {} has non-positive duration",
                clip.id
            )));
        }
        let track = self.track_mut(clip.track_id)?;
        let idx = position.unwrap_or(track.clip_order.len());
        if idx > track.clip_order.len() {
            return Err(TimelineError::InvalidOp(format!(
                "clip index {} out of bounds for track {}",
                idx, track.id
            )));
        }
        track.clip_order.insert(idx, clip.id);
        self.clips.insert(clip.id, clip);
        Ok(())
    }

    /// Removes a clip, returning it with its former index in `clip_order`.
    pub fn remove_clip(&mut self, clip_id: ClipId) -> Result<(Clip, usize), TimelineError> {
        let track_id = self.clip(clip_id)?.track_id;
        let track = self.track_mut(track_id)?;
        let index = track
            .clip_order
            .iter()
            .position(|id| *id == clip_id)
            .ok_or_else(|| {
                TimelineError::InvalidOp(format!("clip {} missing from track order", clip_id))
            })?;
        track.clip_order.remove(index);
        let clip = self
            .clips
            .remove(&clip_id)
            .ok_or(TimelineError::ClipNotFound(clip_id))?;
        Ok((clip, index))
    }

    /// Commits proposed times, returning the previous ones.
    pub fn set_clip_times(
        &mut self,
        clip_id: ClipId,
        times: ClipTimes,
    ) -> Result<ClipTimes, TimelineError> {
        let clip = self
            .clips
            .get_mut(&clip_id)
            .ok_or(TimelineError::ClipNotFound(clip_id))?;
        let previous = clip.times();
        clip.set_times(times);
        Ok(previous)
    }

    /// Moves a track to `index` (clamped to the end), returning its old index.
    pub fn move_track(&mut self, track_id: TrackId, index: usize) -> Result<usize, TimelineError> {
        let current = self
            .track_order
            .iter()
            .position(|id| *id == track_id)
            .ok_or(TimelineError::TrackNotFound(track_id))?;
        let id = self.track_order.remove(current);
        let target = index.min(self.track_order.len());
        self.track_order.insert(target, id);
        Ok(current)
    }

    /// Moves a clip within its track's explicit order, returning its old index.
    pub fn reorder_clip(
        &mut self,
        track_id: TrackId,
        clip_id: ClipId,
        index: usize,
    ) -> Result<usize, TimelineError> {
        let track = self.track_mut(track_id)?;
        let current = track
            .clip_order
            .iter()
            .position(|id| *id == clip_id)
            .ok_or(TimelineError::ClipNotFound(clip_id))?;
        let id = track.clip_order.remove(current);
        let target = index.min(track.clip_order.len());
        track.clip_order.insert(target, id);
        Ok(current)
    }

    pub fn track_snapshot(&self, track_id: TrackId) -> Result<TrackSnapshot, TimelineError> {
        let track = self.track(track_id)?;
        let clips = track
            .clip_order
            .iter()
            .filter_map(|id| self.clips.get(id).map(|c| (*id, c.clone())))
            .collect();
        Ok(TrackSnapshot {
            track_id,
            role: track.role,
            clip_order: track.clip_order.clone(),
            clips,
        })
    }

    /// Boundaries of every clip on every track, plus the origin.
    pub fn all_edges(&self, exclude: Option<ClipId>) -> SnapEdges {
        SnapEdges::from_ranges(
            self.ordered_tracks()
                .flat_map(|t| t.clip_order.iter())
                .filter(|id| Some(**id) != exclude)
                .filter_map(|id| self.clips.get(id).map(Clip::range)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with_track() -> (Project, TrackId) {
        let mut project = Project::new();
        let track = project.add_track(TrackRole::Main, "V1");
        (project, track)
    }

    #[test]
    fn insert_and_remove_clip_keeps_order() {
        let (mut project, track) = project_with_track();
        let a = Clip::new(track, "a.mp4", 0.0, 1000.0, 0.0);
        let b = Clip::new(track, "b.mp4", 1000.0, 2000.0, 0.0);
        let c = Clip::new(track, "c.mp4", 2000.0, 3000.0, 0.0);
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        project.insert_clip(a, None).unwrap();
        project.insert_clip(c, None).unwrap();
        project.insert_clip(b, Some(1)).unwrap();
        assert_eq!(project.track(track).unwrap().clip_order, vec![a_id, b_id, c_id]);

        let (removed, index) = project.remove_clip(b_id).unwrap();
        assert_eq!(removed.id, b_id);
        assert_eq!(index, 1);
        assert_eq!(project.track(track).unwrap().clip_order, vec![a_id, c_id]);
    }

    #[test]
    fn insert_rejects_duplicates_and_bad_positions() {
        let (mut project, track) = project_with_track();
        let clip = Clip::new(track, "a.mp4", 0.0, 1000.0, 0.0);
        project.insert_clip(clip.clone(), None).unwrap();
        assert!(matches!(
            project.insert_clip(clip, None),
            Err(TimelineError::ClipExists(_))
        ));
        let other = Clip::new(track, "b.mp4", 0.0, 1000.0, 0.0);
        assert!(project.insert_clip(other, Some(5)).is_err());
        let empty = Clip::new(track, "c.mp4", 500.0, 500.0, 0.0);
        assert!(project.insert_clip(empty, None).is_err());
    }

    #[test]
    fn new_clip_source_window_matches_duration() {
        let clip = Clip::new(TrackId::new(), "a.mp4", 200.0, 1200.0, 300.0);
        assert_eq!(clip.out_ms - clip.in_ms, clip.duration_ms());
    }

    #[test]
    fn move_track_and_reorder_clip() {
        let mut project = Project::new();
        let v1 = project.add_track(TrackRole::Main, "V1");
        let v2 = project.add_track(TrackRole::Overlay, "V2");
        assert_eq!(project.move_track(v2, 0).unwrap(), 1);
        assert_eq!(project.track_order, vec![v2, v1]);

        let a = Clip::new(v1, "a.mp4", 0.0, 100.0, 0.0);
        let b = Clip::new(v1, "b.mp4", 100.0, 200.0, 0.0);
        let (a_id, b_id) = (a.id, b.id);
        project.insert_clip(a, None).unwrap();
        project.insert_clip(b, None).unwrap();
        assert_eq!(project.reorder_clip(v1, b_id, 0).unwrap(), 1);
        assert_eq!(project.track(v1).unwrap().clip_order, vec![b_id, a_id]);
    }

    #[test]
    fn all_edges_include_origin_and_skip_excluded() {
        let mut project = Project::new();
        let v1 = project.add_track(TrackRole::Main, "V1");
        let v2 = project.add_track(TrackRole::Overlay, "V2");
        let a = Clip::new(v1, "a.mp4", 500.0, 1500.0, 0.0);
        let b = Clip::new(v2, "b.mp4", 2000.0, 2500.0, 0.0);
        let b_id = b.id;
        project.insert_clip(a, None).unwrap();
        project.insert_clip(b, None).unwrap();

        assert_eq!(
            project.all_edges(None).as_slice(),
            &[0.0, 500.0, 1500.0, 2000.0, 2500.0]
        );
        assert_eq!(project.all_edges(Some(b_id)).as_slice(), &[0.0, 500.0, 1500.0]);
    }

    #[test]
    fn remove_track_takes_its_clips() {
        let (mut project, track) = project_with_track();
        let clip = Clip::new(track, "a.mp4", 0.0, 1000.0, 0.0);
        let clip_id = clip.id;
        project.insert_clip(clip, None).unwrap();
        let (removed, clips, index) = project.remove_track(track).unwrap();
        assert_eq!(removed.id, track);
        assert_eq!(index, 0);
        assert_eq!(clips.len(), 1);
        assert!(project.clip(clip_id).is_err());
    }
}
