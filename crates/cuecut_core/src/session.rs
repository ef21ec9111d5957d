use serde::Serialize;
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::editing::MediaItem;
use crate::error::{CoreError, Result};
use crate::playback::{self, ActiveClips};
use crate::types::*;

/// The single owner of an editing session's timeline, cues and playhead.
///
/// Engines produce a new timeline; the session swaps it in whole and then
/// re-clamps both cursors, so readers never observe a half-applied edit.
#[derive(Debug, Clone)]
pub struct EditorSession {
    timeline: Timeline,
    cues: Vec<ScriptCue>,
    current_time: TimeUs,
    insertion_time: TimeUs,
    config: EditorConfig,
}

/// What the render surface draws.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub timeline: &'a Timeline,
    pub current_time: TimeUs,
    pub insertion_time: TimeUs,
    pub total_duration: TimeUs,
}

/// Everything live at the playhead.
#[derive(Debug, Clone, Serialize)]
pub struct Active<'a> {
    pub clips: ActiveClips<'a>,
    pub cue: Option<&'a ScriptCue>,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            timeline: Timeline::new(),
            cues: vec![],
            current_time: TimeUs::ZERO,
            insertion_time: TimeUs::ZERO,
            config,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn cues(&self) -> &[ScriptCue] {
        &self.cues
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn current_time(&self) -> TimeUs {
        self.current_time
    }

    pub fn insertion_time(&self) -> TimeUs {
        self.insertion_time
    }

    pub fn total_duration(&self) -> TimeUs {
        self.timeline.total_duration()
    }

    /// Move the playhead, clamped to the timeline. Returns where it landed.
    pub fn seek(&mut self, time: TimeUs) -> TimeUs {
        self.current_time = self.clamp(time);
        self.current_time
    }

    /// Move the insertion cursor, clamped, and bring the playhead along.
    pub fn set_insertion_time(&mut self, time: TimeUs) -> TimeUs {
        self.insertion_time = self.clamp(time);
        self.seek(self.insertion_time)
    }

    /// Ripple-insert probed media at the insertion cursor. Returns the ids of
    /// the new clips.
    pub fn import(&mut self, batch: &[MediaItem]) -> Vec<Uuid> {
        let insertion = self.timeline.insert_media(batch, self.insertion_time);
        self.replace_timeline(insertion.timeline);
        self.insertion_time = self.clamp(insertion.insertion_time);
        insertion.inserted
    }

    /// Relocate a clip. Returns false when the request was ignored.
    pub fn relocate(
        &mut self,
        clip_id: Uuid,
        from_track: Uuid,
        to_track: Uuid,
        new_start: TimeUs,
    ) -> bool {
        match self
            .timeline
            .try_relocate_clip(clip_id, from_track, to_track, new_start)
        {
            Ok(next) => {
                self.replace_timeline(next);
                true
            }
            Err(e) => {
                tracing::debug!(%clip_id, error = %e, "relocation ignored");
                false
            }
        }
    }

    pub fn add_track(&mut self, kind: TrackKind) -> Result<Uuid> {
        let (next, track_id) = self.timeline.with_track(kind)?;
        self.replace_timeline(next);
        Ok(track_id)
    }

    pub fn remove_track(&mut self, track_id: Uuid) {
        let next = self.timeline.without_track(track_id);
        self.replace_timeline(next);
    }

    pub fn remove_clip(&mut self, clip_id: Uuid) {
        let next = self.timeline.without_clip(clip_id);
        self.replace_timeline(next);
    }

    pub fn set_cues(&mut self, cues: Vec<ScriptCue>) {
        tracing::info!(count = cues.len(), "script cues replaced");
        self.cues = cues;
    }

    /// Turn a script cue into a text clip at the playhead.
    pub fn promote_cue(&mut self, cue_id: Uuid) -> Result<Uuid> {
        let cue = self
            .cues
            .iter()
            .find(|c| c.id == cue_id)
            .ok_or(CoreError::CueNotFound(cue_id))?;
        let clip = Clip::text(
            cue.text.clone(),
            cue.color.clone(),
            self.current_time,
            self.config.default_text_duration,
        )?;
        let clip_id = clip.id;
        let next = self.timeline.insert_text_clip(clip)?;
        self.replace_timeline(next);
        tracing::info!(%cue_id, %clip_id, "cue promoted to text clip");
        Ok(clip_id)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            timeline: &self.timeline,
            current_time: self.current_time,
            insertion_time: self.insertion_time,
            total_duration: self.total_duration(),
        }
    }

    /// Resolve clips and cue under the playhead.
    pub fn active(&self) -> Active<'_> {
        Active {
            clips: playback::resolve(&self.timeline, self.current_time),
            cue: playback::active_cue(&self.cues, self.current_time, self.config.cue_tolerance),
        }
    }

    fn clamp(&self, time: TimeUs) -> TimeUs {
        time.clamp(TimeUs::ZERO, self.total_duration())
    }

    fn replace_timeline(&mut self, next: Timeline) {
        self.timeline = next;
        self.current_time = self.clamp(self.current_time);
        self.insertion_time = self.clamp(self.insertion_time);
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
