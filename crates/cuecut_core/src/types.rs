use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub};
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::{CoreError, Result};

// ---------------------------------------------------------------------------
// TimeUs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeUs(pub i64);

impl TimeUs {
    pub const ZERO: Self = Self(0);

    /// Nearest microsecond to `s` seconds.
    pub fn from_seconds(s: f64) -> Self {
        Self((s * 1_000_000.0).round() as i64)
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms.saturating_mul(1_000))
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    pub fn abs_diff(self, other: Self) -> Self {
        Self(i64::try_from(self.0.abs_diff(other.0)).unwrap_or(i64::MAX))
    }
}

impl Add for TimeUs {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for TimeUs {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for TimeUs {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<i64> for TimeUs {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Div<i64> for TimeUs {
    type Output = Self;
    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

impl Sum for TimeUs {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(TimeUs::ZERO, |acc, t| acc + t)
    }
}

impl fmt::Display for TimeUs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_us = self.0.unsigned_abs();
        let total_ms = total_us / 1_000;
        let ms = total_ms % 1_000;
        let total_secs = total_ms / 1_000;
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let hours = total_mins / 60;
        if self.0 < 0 {
            write!(f, "-{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        } else {
            write!(f, "{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        }
    }
}

// ---------------------------------------------------------------------------
// TrackKind / MediaKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
}

/// Kinds of media that come out of an import. Text never does.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl From<MediaKind> for TrackKind {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Video => TrackKind::Video,
            MediaKind::Audio => TrackKind::Audio,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => f.write_str("video"),
            MediaKind::Audio => f.write_str("audio"),
        }
    }
}

// ---------------------------------------------------------------------------
// MediaRef
// ---------------------------------------------------------------------------

/// A decoded media resource: where the bytes live, how a player reaches them,
/// and how long the probe said they run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaRef {
    pub name: String,
    pub path: PathBuf,
    pub url: String,
    pub source_duration: TimeUs,
}

/// Colors handed out to video clips, in insertion order.
pub const CLIP_COLORS: [&str; 5] = ["#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6"];

// ---------------------------------------------------------------------------
// Clip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClipContent {
    Video { media: MediaRef, color: String },
    Audio { media: MediaRef },
    Text { text: String, color: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub id: Uuid,
    pub start: TimeUs,
    pub duration: TimeUs,
    #[serde(flatten)]
    pub content: ClipContent,
}

impl Clip {
    /// Build a clip, rejecting negative starts and non-positive durations.
    pub fn new(start: TimeUs, duration: TimeUs, content: ClipContent) -> Result<Self> {
        if duration <= TimeUs::ZERO {
            return Err(CoreError::InvalidClip(format!(
                "duration must be positive, got {duration}"
            )));
        }
        if start < TimeUs::ZERO {
            return Err(CoreError::InvalidClip(format!(
                "start must not be negative, got {start}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            start,
            duration,
            content,
        })
    }

    pub fn video(media: MediaRef, start: TimeUs, color: impl Into<String>) -> Result<Self> {
        let duration = media.source_duration;
        Self::new(
            start,
            duration,
            ClipContent::Video {
                media,
                color: color.into(),
            },
        )
    }

    pub fn audio(media: MediaRef, start: TimeUs) -> Result<Self> {
        let duration = media.source_duration;
        Self::new(start, duration, ClipContent::Audio { media })
    }

    pub fn text(
        text: impl Into<String>,
        color: impl Into<String>,
        start: TimeUs,
        duration: TimeUs,
    ) -> Result<Self> {
        Self::new(
            start,
            duration,
            ClipContent::Text {
                text: text.into(),
                color: color.into(),
            },
        )
    }

    pub fn kind(&self) -> TrackKind {
        match self.content {
            ClipContent::Video { .. } => TrackKind::Video,
            ClipContent::Audio { .. } => TrackKind::Audio,
            ClipContent::Text { .. } => TrackKind::Text,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self.content, ClipContent::Video { .. })
    }

    pub fn is_audio(&self) -> bool {
        matches!(self.content, ClipContent::Audio { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.content, ClipContent::Text { .. })
    }

    pub fn end(&self) -> TimeUs {
        self.start + self.duration
    }

    pub fn media(&self) -> Option<&MediaRef> {
        match &self.content {
            ClipContent::Video { media, .. } | ClipContent::Audio { media } => Some(media),
            ClipContent::Text { .. } => None,
        }
    }

    /// Order by start time only; used for stable sorts so ties keep their
    /// original relative order.
    pub fn cmp_start(&self, other: &Clip) -> Ordering {
        self.start.cmp(&other.start)
    }

    /// Two clips overlap if their `[start, end)` ranges intersect.
    pub fn overlaps(&self, other: &Clip) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: Uuid,
    pub kind: TrackKind,
    pub(crate) clips: Vec<Clip>,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            clips: vec![],
        }
    }

    /// Build a track from existing clips. Every clip must match `kind`;
    /// the clips are stably sorted by start.
    pub fn with_clips(kind: TrackKind, mut clips: Vec<Clip>) -> Result<Self> {
        if let Some(clip) = clips.iter().find(|c| c.kind() != kind) {
            return Err(CoreError::KindMismatch {
                clip: clip.kind(),
                track: kind,
            });
        }
        clips.sort_by(Clip::cmp_start);
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            clips,
        })
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clip(&self, clip_id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    /// End of the last clip on the track, zero when empty.
    pub fn end(&self) -> TimeUs {
        self.clips
            .iter()
            .map(Clip::end)
            .max()
            .unwrap_or(TimeUs::ZERO)
    }

    /// True when no two clips on the track overlap.
    pub fn is_non_overlapping(&self) -> bool {
        let mut sorted: Vec<&Clip> = self.clips.iter().collect();
        sorted.sort_by(|a, b| a.cmp_start(b));
        sorted.windows(2).all(|w| w[0].end() <= w[1].start)
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// Ordered list of tracks. Holds exactly one video track.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Timeline {
    pub(crate) tracks: Vec<Track>,
}

// ---------------------------------------------------------------------------
// ScriptCue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CueCategory {
    Dialogue,
    Audio,
    Visual,
    Effect,
}

impl CueCategory {
    pub fn default_color(&self) -> &'static str {
        match self {
            CueCategory::Dialogue => "#34d399",
            CueCategory::Audio => "#60a5fa",
            CueCategory::Visual => "#f87171",
            CueCategory::Effect => "#facc15",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dialogue" => Some(CueCategory::Dialogue),
            "audio" => Some(CueCategory::Audio),
            "visual" => Some(CueCategory::Visual),
            "effect" => Some(CueCategory::Effect),
            _ => None,
        }
    }
}

/// An instantaneous, time-stamped script marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptCue {
    pub id: Uuid,
    pub time: TimeUs,
    pub text: String,
    pub speaker: Option<String>,
    pub category: CueCategory,
    pub color: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
