use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Clip, ClipId, Ms, Project, TimelineError, TrackId};

/// Ids involved in one split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitOutcome {
    pub original: ClipId,
    pub left_id: ClipId,
    pub right_id: ClipId,
}

/// Which clips a playhead split considers when nothing is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitScope {
    Track(TrackId),
    AllTracks,
}

/// Cuts `clip` at `at_ms` into two fresh clips. Returns `None` unless the cut
/// is strictly inside the clip.
pub fn split_clip(clip: &Clip, at_ms: Ms) -> Option<(Clip, Clip)> {
    split_clip_with_ids(clip, at_ms, ClipId::new(), ClipId::new())
}

/// [`split_clip`] with caller-chosen ids, so a replayed split produces the
/// same clips.
pub fn split_clip_with_ids(
    clip: &Clip,
    at_ms: Ms,
    left_id: ClipId,
    right_id: ClipId,
) -> Option<(Clip, Clip)> {
    if !clip.range().contains_strict(at_ms) {
        return None;
    }
    let left = Clip {
        id: left_id,
        end_ms: at_ms,
        out_ms: clip.out_ms - (clip.end_ms - at_ms),
        ..clip.clone()
    };
    let right = Clip {
        id: right_id,
        start_ms: at_ms,
        in_ms: clip.in_ms + (at_ms - clip.start_ms),
        ..clip.clone()
    };
    Some((left, right))
}

impl Project {
    /// Replaces a clip by its two halves at the same place in its track's
    /// order. `Ok(None)` when `at_ms` is not strictly inside the clip.
    pub fn split_clip(
        &mut self,
        clip_id: ClipId,
        at_ms: Ms,
    ) -> Result<Option<SplitOutcome>, TimelineError> {
        self.split_clip_with_ids(clip_id, at_ms, ClipId::new(), ClipId::new())
    }

    pub fn split_clip_with_ids(
        &mut self,
        clip_id: ClipId,
        at_ms: Ms,
        left_id: ClipId,
        right_id: ClipId,
    ) -> Result<Option<SplitOutcome>, TimelineError> {
        let clip = self.clip(clip_id)?;
        if left_id == right_id {
            return Err(TimelineError::ClipExists(right_id));
        }
        if let Some(taken) = [left_id, right_id]
            .into_iter()
            .find(|id| self.clips.contains_key(id))
        {
            return Err(TimelineError::ClipExists(taken));
        }
        let Some((left, right)) = split_clip_with_ids(clip, at_ms, left_id, right_id) else {
            return Ok(None);
        };
        let (_, index) = self.remove_clip(clip_id)?;
        self.insert_clip(left, Some(index))?;
        self.insert_clip(right, Some(index + 1))?;
        debug!(clip = %clip_id, at_ms, left = %left_id, right = %right_id, "split clip");
        Ok(Some(SplitOutcome {
            original: clip_id,
            left_id,
            right_id,
        }))
    }

    /// Clips in scope whose interval strictly contains `ms`, in track order.
    pub fn clips_at(&self, ms: Ms, scope: SplitScope) -> Vec<ClipId> {
        self.ordered_tracks()
            .filter(|t| match scope {
                SplitScope::Track(id) => t.id == id,
                SplitScope::AllTracks => true,
            })
            .flat_map(|t| t.clip_order.iter())
            .filter(|id| {
                self.clips
                    .get(id)
                    .is_some_and(|c| c.range().contains_strict(ms))
            })
            .copied()
            .collect()
    }

    /// Splits the selection at the playhead, or every clip under the
    /// playhead in `scope` when nothing is selected. Clips the playhead is
    /// not strictly inside are skipped.
    pub fn split_at_playhead(
        &mut self,
        selection: &[ClipId],
        playhead_ms: Ms,
        scope: SplitScope,
    ) -> Result<Vec<SplitOutcome>, TimelineError> {
        let targets = if selection.is_empty() {
            self.clips_at(playhead_ms, scope)
        } else {
            selection.to_vec()
        };
        let mut outcomes = Vec::new();
        for clip_id in targets {
            if let Some(outcome) = self.split_clip(clip_id, playhead_ms)? {
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrackRole;

    #[test]
    fn split_produces_exact_halves() {
        let clip = Clip::new(TrackId::new(), "a.mp4", 0.0, 10_000.0, 0.0);
        let (left, right) = split_clip(&clip, 4000.0).unwrap();
        assert_eq!((left.start_ms, left.end_ms), (0.0, 4000.0));
        assert_eq!((left.in_ms, left.out_ms), (0.0, 4000.0));
        assert_eq!((right.start_ms, right.end_ms), (4000.0, 10_000.0));
        assert_eq!((right.in_ms, right.out_ms), (4000.0, 10_000.0));
        assert_ne!(left.id, clip.id);
        assert_ne!(right.id, left.id);
    }

    #[test]
    fn split_on_boundary_is_rejected() {
        let clip = Clip::new(TrackId::new(), "a.mp4", 0.0, 10_000.0, 0.0);
        assert!(split_clip(&clip, 0.0).is_none());
        assert!(split_clip(&clip, 10_000.0).is_none());
        assert!(split_clip(&clip, 12_000.0).is_none());
    }

    #[test]
    fn split_keeps_source_offsets() {
        let clip = Clip::new(TrackId::new(), "a.mp4", 1000.0, 3000.0, 700.0);
        let (left, right) = split_clip(&clip, 1500.0).unwrap();
        assert_eq!(left.out_ms, 1200.0);
        assert_eq!(right.in_ms, 1200.0);
        assert_eq!(right.out_ms, clip.out_ms);
        assert_eq!(left.out_ms - left.in_ms, left.duration_ms());
        assert_eq!(right.out_ms - right.in_ms, right.duration_ms());
    }

    #[test]
    fn project_split_replaces_in_place() {
        let mut project = Project::new();
        let track = project.add_track(TrackRole::Main, "V1");
        let a = Clip::new(track, "a.mp4", 0.0, 1000.0, 0.0);
        let b = Clip::new(track, "b.mp4", 1000.0, 3000.0, 0.0);
        let c = Clip::new(track, "c.mp4", 3000.0, 4000.0, 0.0);
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        for clip in [a, b, c] {
            project.insert_clip(clip, None).unwrap();
        }

        let outcome = project.split_clip(b_id, 2000.0).unwrap().unwrap();
        assert_eq!(
            project.track(track).unwrap().clip_order,
            vec![a_id, outcome.left_id, outcome.right_id, c_id]
        );
        assert!(project.clip(b_id).is_err());
        assert_eq!(project.split_clip(a_id, 1000.0).unwrap(), None);
    }

    #[test]
    fn playhead_split_without_selection_uses_scope() {
        let mut project = Project::new();
        let v1 = project.add_track(TrackRole::Main, "V1");
        let v2 = project.add_track(TrackRole::Overlay, "V2");
        project
            .insert_clip(Clip::new(v1, "a.mp4", 0.0, 2000.0, 0.0), None)
            .unwrap();
        project
            .insert_clip(Clip::new(v2, "b.mp4", 500.0, 1500.0, 0.0), None)
            .unwrap();
        project
            .insert_clip(Clip::new(v2, "c.mp4", 1000.0, 3000.0, 0.0), None)
            .unwrap();

        let split = project
            .split_at_playhead(&[], 1000.0, SplitScope::Track(v1))
            .unwrap();
        assert_eq!(split.len(), 1);
        assert_eq!(project.clips.len(), 4);

        // c starts exactly at the playhead and is left alone
        let split = project
            .split_at_playhead(&[], 1000.0, SplitScope::AllTracks)
            .unwrap();
        assert_eq!(split.len(), 1);
        assert_eq!(project.clips.len(), 5);
    }

    #[test]
    fn playhead_split_prefers_selection() {
        let mut project = Project::new();
        let v1 = project.add_track(TrackRole::Main, "V1");
        let a = Clip::new(v1, "a.mp4", 0.0, 2000.0, 0.0);
        let b = Clip::new(v1, "b.mp4", 2000.0, 4000.0, 0.0);
        let b_id = b.id;
        project.insert_clip(a, None).unwrap();
        project.insert_clip(b, None).unwrap();

        // playhead outside the selected clip: nothing happens
        let split = project
            .split_at_playhead(&[b_id], 1000.0, SplitScope::AllTracks)
            .unwrap();
        assert!(split.is_empty());
        assert_eq!(project.clips.len(), 2);
    }
}
