use crate::error::{CoreError, Result};
use crate::types::*;
use uuid::Uuid;

impl Timeline {
    /// A fresh timeline holding only the empty primary video track.
    pub fn new() -> Self {
        Self {
            tracks: vec![Track::new(TrackKind::Video)],
        }
    }

    /// Assemble a timeline from prepared tracks, validating every invariant.
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self> {
        let timeline = Self { tracks };
        timeline.check_invariants()?;
        Ok(timeline)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, track_id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    /// The primary (and only) video track.
    pub fn video_track(&self) -> &Track {
        self.tracks
            .iter()
            .find(|t| t.kind == TrackKind::Video)
            .unwrap_or_else(|| unreachable!("timeline always holds a video track"))
    }

    pub fn first_track_of(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    /// Locate a clip anywhere on the timeline, with the id of its track.
    pub fn find_clip(&self, clip_id: Uuid) -> Option<(Uuid, &Clip)> {
        self.tracks
            .iter()
            .find_map(|t| t.clip(clip_id).map(|c| (t.id, c)))
    }

    pub fn clips_of(&self, kind: TrackKind) -> impl Iterator<Item = &Clip> {
        self.tracks
            .iter()
            .filter(move |t| t.kind == kind)
            .flat_map(|t| t.clips.iter())
    }

    /// End of the furthest clip on the primary video track. Audio and text
    /// never extend it.
    pub fn total_duration(&self) -> TimeUs {
        self.video_track().end()
    }

    /// Every video and audio clip ordered by start, video first on ties.
    pub fn media_clips(&self) -> Vec<&Clip> {
        let mut clips: Vec<&Clip> = self
            .clips_of(TrackKind::Video)
            .chain(self.clips_of(TrackKind::Audio))
            .collect();
        clips.sort_by(|a, b| a.cmp_start(b));
        clips
    }

    /// Append an empty audio or text track. Returns the new timeline and the
    /// id of the created track.
    pub fn with_track(&self, kind: TrackKind) -> Result<(Timeline, Uuid)> {
        if kind == TrackKind::Video {
            return Err(CoreError::InvalidOperation(
                "a timeline holds exactly one video track".into(),
            ));
        }
        let track = Track::new(kind);
        let track_id = track.id;
        let mut next = self.clone();
        next.tracks.push(track);
        tracing::debug!(%track_id, ?kind, "track added");
        Ok((next, track_id))
    }

    /// Drop an audio or text track with all its clips. The primary video
    /// track and unknown ids leave the timeline unchanged.
    pub fn without_track(&self, track_id: Uuid) -> Timeline {
        match self.track(track_id) {
            None => {
                tracing::debug!(%track_id, "remove ignored: unknown track");
                self.clone()
            }
            Some(track) if track.kind == TrackKind::Video => {
                tracing::debug!(%track_id, "remove ignored: primary video track");
                self.clone()
            }
            Some(_) => {
                let mut next = self.clone();
                next.tracks.retain(|t| t.id != track_id);
                tracing::debug!(%track_id, "track removed");
                next
            }
        }
    }

    /// Drop a single clip from whichever track holds it. Neighbours keep
    /// their positions; unknown ids leave the timeline unchanged.
    pub fn without_clip(&self, clip_id: Uuid) -> Timeline {
        let mut next = self.clone();
        for track in &mut next.tracks {
            if let Some(pos) = track.clips.iter().position(|c| c.id == clip_id) {
                track.clips.remove(pos);
                tracing::debug!(%clip_id, track_id = %track.id, "clip removed");
                return next;
            }
        }
        tracing::debug!(%clip_id, "remove ignored: unknown clip");
        next
    }

    pub(crate) fn track_index(&self, track_id: Uuid) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track_id)
    }

    /// Index of the first track of `kind`, appending an empty one if none
    /// exists yet.
    pub(crate) fn ensure_track(&mut self, kind: TrackKind) -> usize {
        match self.tracks.iter().position(|t| t.kind == kind) {
            Some(idx) => idx,
            None => {
                self.tracks.push(Track::new(kind));
                self.tracks.len() - 1
            }
        }
    }

    pub(crate) fn video_track_index(&self) -> usize {
        self.tracks
            .iter()
            .position(|t| t.kind == TrackKind::Video)
            .unwrap_or_else(|| unreachable!("timeline always holds a video track"))
    }

    /// Verify the structural invariants. A failure here is a programming
    /// error, never a user mistake.
    pub fn check_invariants(&self) -> Result<()> {
        let video_tracks = self
            .tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Video)
            .count();
        if video_tracks != 1 {
            return Err(CoreError::InvariantViolation(format!(
                "expected exactly one video track, found {video_tracks}"
            )));
        }

        for track in &self.tracks {
            for clip in &track.clips {
                if clip.kind() != track.kind {
                    return Err(CoreError::InvariantViolation(format!(
                        "clip {} of kind {:?} on {:?} track {}",
                        clip.id,
                        clip.kind(),
                        track.kind,
                        track.id
                    )));
                }
                if clip.duration <= TimeUs::ZERO || clip.start < TimeUs::ZERO {
                    return Err(CoreError::InvariantViolation(format!(
                        "clip {} has start {} and duration {}",
                        clip.id, clip.start, clip.duration
                    )));
                }
            }
        }

        // audio stacks at the insertion point; video and text never overlap
        for track in self.tracks.iter().filter(|t| t.kind != TrackKind::Audio) {
            let sorted = track.clips.windows(2).all(|w| w[0].start <= w[1].start);
            if !sorted || !track.is_non_overlapping() {
                return Err(CoreError::InvariantViolation(format!(
                    "{:?} track {} has overlapping or unordered clips",
                    track.kind, track.id
                )));
            }
        }
        Ok(())
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
