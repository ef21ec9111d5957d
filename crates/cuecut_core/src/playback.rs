//! Read-side resolution of what is on screen and on air at a playhead time.
//!
//! Everything here is a pure function of the timeline and a time value, cheap
//! enough to run on every playback tick.

use serde::Serialize;

use crate::types::*;

/// Default half-width of the window in which a script cue counts as current.
pub const CUE_TOLERANCE: TimeUs = TimeUs(500_000);

/// Drift between a media player and the timeline beyond which the player
/// should be re-seeked.
pub const RESYNC_THRESHOLD: TimeUs = TimeUs(200_000);

/// Clips under the playhead, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActiveClips<'a> {
    pub video: Option<&'a Clip>,
    pub audio: Vec<&'a Clip>,
    pub text: Vec<&'a Clip>,
}

impl ActiveClips<'_> {
    pub fn is_empty(&self) -> bool {
        self.video.is_none() && self.audio.is_empty() && self.text.is_empty()
    }
}

impl Clip {
    /// Half-open: active from `start` up to, not including, `start + duration`.
    pub fn is_active_at(&self, time: TimeUs) -> bool {
        time >= self.start && time < self.end()
    }

    /// Position inside the clip's own media for a timeline time, if the clip
    /// is active then.
    pub fn local_offset(&self, time: TimeUs) -> Option<TimeUs> {
        self.is_active_at(time).then(|| time - self.start)
    }
}

/// Resolve the active clips at `time`, scanning tracks in display order.
pub fn resolve(timeline: &Timeline, time: TimeUs) -> ActiveClips<'_> {
    let mut active = ActiveClips::default();
    for track in timeline.tracks() {
        for clip in track.clips().iter().filter(|c| c.is_active_at(time)) {
            match clip.content {
                ClipContent::Video { .. } => {
                    if active.video.is_none() {
                        active.video = Some(clip);
                    }
                }
                ClipContent::Audio { .. } => active.audio.push(clip),
                ClipContent::Text { .. } => active.text.push(clip),
            }
        }
    }
    active
}

/// The first cue whose time lies strictly within `tolerance` of `time`.
pub fn active_cue(cues: &[ScriptCue], time: TimeUs, tolerance: TimeUs) -> Option<&ScriptCue> {
    cues.iter().find(|cue| cue.time.abs_diff(time) < tolerance)
}

/// Whether a player reporting `player_position` has drifted from `expected`
/// far enough to be re-seeked.
pub fn needs_resync(player_position: TimeUs, expected: TimeUs, threshold: TimeUs) -> bool {
    player_position.abs_diff(expected) > threshold
}
