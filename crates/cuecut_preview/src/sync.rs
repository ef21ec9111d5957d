//! Keeps an external media player in step with the timeline playhead.

use cuecut_core::playback::needs_resync;
use cuecut_core::{Clip, TimeUs};
use serde_json::{json, Value};
use uuid::Uuid;

/// What a player has to do to show the right frame for the current tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    /// Nothing on this track and nothing loaded.
    Idle,
    /// Switch to another clip's media and jump to `offset` inside it.
    Load {
        clip_id: Uuid,
        url: String,
        offset: TimeUs,
    },
    /// Same clip, but the player drifted too far.
    Seek { offset: TimeUs },
    /// The playhead left the last clip.
    Unload,
    /// In step; let it play.
    Continue,
}

impl SyncAction {
    /// The mpv IPC command(s) carrying out this action.
    pub fn to_mpv_commands(&self) -> Vec<Value> {
        match self {
            SyncAction::Idle | SyncAction::Continue => vec![],
            SyncAction::Load { url, offset, .. } => vec![
                json!({ "command": ["loadfile", url] }),
                json!({ "command": ["seek", offset.as_seconds(), "absolute"] }),
            ],
            SyncAction::Seek { offset } => {
                vec![json!({ "command": ["seek", offset.as_seconds(), "absolute"] })]
            }
            SyncAction::Unload => vec![json!({ "command": ["stop"] })],
        }
    }
}

/// Tracks which clip a single player has loaded.
#[derive(Debug, Clone)]
pub struct PlayerSync {
    threshold: TimeUs,
    loaded: Option<Uuid>,
}

impl PlayerSync {
    pub fn new(threshold: TimeUs) -> Self {
        Self {
            threshold,
            loaded: None,
        }
    }

    pub fn loaded(&self) -> Option<Uuid> {
        self.loaded
    }

    /// Decide what the player should do given the clip active at `time` and
    /// the position the player reports inside its media.
    pub fn reconcile(&mut self, active: Option<&Clip>, time: TimeUs, player_position: TimeUs) -> SyncAction {
        let Some(clip) = active else {
            return match self.loaded.take() {
                Some(_) => SyncAction::Unload,
                None => SyncAction::Idle,
            };
        };
        let Some(media) = clip.media() else {
            return SyncAction::Idle;
        };
        let offset = clip.local_offset(time).unwrap_or(TimeUs::ZERO);

        if self.loaded != Some(clip.id) {
            self.loaded = Some(clip.id);
            tracing::debug!(clip_id = %clip.id, %offset, "player switching clip");
            return SyncAction::Load {
                clip_id: clip.id,
                url: media.url.clone(),
                offset,
            };
        }

        if needs_resync(player_position, offset, self.threshold) {
            tracing::debug!(%player_position, expected = %offset, "player resync");
            SyncAction::Seek { offset }
        } else {
            SyncAction::Continue
        }
    }
}
