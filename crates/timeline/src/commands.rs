use serde::{Deserialize, Serialize};

use crate::{Clip, ClipId, ClipTimes, Ms, Project, TimelineError, Track, TrackId};

/// Invertible edits on a [`Project`]. Applying one returns the command that
/// undoes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditCommand {
    InsertClip {
        clip: Clip,
        #[serde(default)]
        position: Option<usize>,
    },
    RemoveClip {
        clip_id: ClipId,
    },
    SetClipTimes {
        clip_id: ClipId,
        times: ClipTimes,
    },
    Split {
        clip_id: ClipId,
        at_ms: Ms,
        left_id: ClipId,
        right_id: ClipId,
    },
    /// Undoes a split: the two halves are replaced by `original`.
    Join {
        left_id: ClipId,
        right_id: ClipId,
        original: Clip,
    },
    AddTrack {
        track: Track,
        #[serde(default)]
        clips: Vec<Clip>,
        index: usize,
    },
    RemoveTrack {
        track_id: TrackId,
    },
    MoveTrack {
        track_id: TrackId,
        index: usize,
    },
    ReorderClip {
        track_id: TrackId,
        clip_id: ClipId,
        index: usize,
    },
}

impl EditCommand {
    /// A split with freshly generated ids for the two halves.
    pub fn split(clip_id: ClipId, at_ms: Ms) -> Self {
        Self::Split {
            clip_id,
            at_ms,
            left_id: ClipId::new(),
            right_id: ClipId::new(),
        }
    }
}

pub fn apply_command(
    project: &mut Project,
    command: EditCommand,
) -> Result<EditCommand, TimelineError> {
    match command {
        EditCommand::InsertClip { clip, position } => {
            let clip_id = clip.id;
            project.insert_clip(clip, position)?;
            Ok(EditCommand::RemoveClip { clip_id })
        }
        EditCommand::RemoveClip { clip_id } => {
            let (clip, index) = project.remove_clip(clip_id)?;
            Ok(EditCommand::InsertClip {
                clip,
                position: Some(index),
            })
        }
        EditCommand::SetClipTimes { clip_id, times } => {
            let previous = project.set_clip_times(clip_id, times)?;
            Ok(EditCommand::SetClipTimes {
                clip_id,
                times: previous,
            })
        }
        EditCommand::Split {
            clip_id,
            at_ms,
            left_id,
            right_id,
        } => split(project, clip_id, at_ms, left_id, right_id),
        EditCommand::Join {
            left_id,
            right_id,
            original,
        } => join(project, left_id, right_id, original),
        EditCommand::AddTrack {
            track,
            clips,
            index,
        } => {
            let track_id = track.id;
            project.insert_track(track, clips, index)?;
            Ok(EditCommand::RemoveTrack { track_id })
        }
        EditCommand::RemoveTrack { track_id } => {
            let (track, clips, index) = project.remove_track(track_id)?;
            Ok(EditCommand::AddTrack {
                track,
                clips,
                index,
            })
        }
        EditCommand::MoveTrack { track_id, index } => {
            let previous = project.move_track(track_id, index)?;
            Ok(EditCommand::MoveTrack {
                track_id,
                index: previous,
            })
        }
        EditCommand::ReorderClip {
            track_id,
            clip_id,
            index,
        } => {
            let previous = project.reorder_clip(track_id, clip_id, index)?;
            Ok(EditCommand::ReorderClip {
                track_id,
                clip_id,
                index: previous,
            })
        }
    }
}

fn split(
    project: &mut Project,
    clip_id: ClipId,
    at_ms: Ms,
    left_id: ClipId,
    right_id: ClipId,
) -> Result<EditCommand, TimelineError> {
    let original = project.clip(clip_id)?.clone();
    project
        .split_clip_with_ids(clip_id, at_ms, left_id, right_id)?
        .ok_or(TimelineError::SplitOutsideClip {
            clip: clip_id,
            at_ms,
        })?;
    Ok(EditCommand::Join {
        left_id,
        right_id,
        original,
    })
}

fn join(
    project: &mut Project,
    left_id: ClipId,
    right_id: ClipId,
    original: Clip,
) -> Result<EditCommand, TimelineError> {
    let left = project.clip(left_id)?;
    let at_ms = left.end_ms;
    let right = project.clip(right_id)?;
    if left_id == right_id
        || left.track_id != original.track_id
        || right.track_id != original.track_id
        || original.end_ms <= original.start_ms
    {
        return Err(TimelineError::InvalidOp(format!(
            "cannot join {} and {} into {}",
            left_id, right_id, original.id
        )));
    }
    if project.clips.contains_key(&original.id) {
        return Err(TimelineError::ClipExists(original.id));
    }
    project.remove_clip(right_id)?;
    let (_, index) = project.remove_clip(left_id)?;
    let clip_id = original.id;
    project.insert_clip(original, Some(index))?;
    Ok(EditCommand::Split {
        clip_id,
        at_ms,
        left_id,
        right_id,
    })
}

#[derive(Debug, Default, Clone)]
pub struct CommandHistory {
    undo_stack: Vec<EditCommand>,
    redo_stack: Vec<EditCommand>,
}

impl CommandHistory {
    pub fn apply(&mut self, project: &mut Project, command: EditCommand) -> Result<(), TimelineError> {
        let inverse = apply_command(project, command)?;
        self.undo_stack.push(inverse);
        self.redo_stack.clear();
        Ok(())
    }

    pub fn undo(&mut self, project: &mut Project) -> Result<(), TimelineError> {
        let command = self
            .undo_stack
            .pop()
            .ok_or(TimelineError::HistoryEmpty("undo stack"))?;
        let inverse = apply_command(project, command)?;
        self.redo_stack.push(inverse);
        Ok(())
    }

    pub fn redo(&mut self, project: &mut Project) -> Result<(), TimelineError> {
        let command = self
            .redo_stack
            .pop()
            .ok_or(TimelineError::HistoryEmpty("redo stack"))?;
        let inverse = apply_command(project, command)?;
        self.undo_stack.push(inverse);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
