//! Fixtures shared by the unit tests.

use std::path::PathBuf;

use crate::editing::MediaItem;
use crate::types::*;

pub fn media(name: &str, secs: f64) -> MediaRef {
    MediaRef {
        name: name.to_string(),
        path: PathBuf::from(format!("/media/{name}")),
        url: format!("file:///media/{name}"),
        source_duration: TimeUs::from_seconds(secs),
    }
}

pub fn video_item(name: &str, secs: f64) -> MediaItem {
    MediaItem::new(MediaKind::Video, media(name, secs))
}

pub fn audio_item(name: &str, secs: f64) -> MediaItem {
    MediaItem::new(MediaKind::Audio, media(name, secs))
}

pub fn secs(s: f64) -> TimeUs {
    TimeUs::from_seconds(s)
}

pub fn video_clip(start: f64, dur: f64) -> Clip {
    Clip::video(media("v.mp4", dur), secs(start), CLIP_COLORS[0]).unwrap()
}

pub fn audio_clip(start: f64, dur: f64) -> Clip {
    Clip::audio(media("a.wav", dur), secs(start)).unwrap()
}

pub fn text_clip(start: f64, dur: f64) -> Clip {
    Clip::text("caption", "#ffffff", secs(start), secs(dur)).unwrap()
}

/// (start, duration) pairs in seconds, in track order.
pub fn layout(track: &Track) -> Vec<(f64, f64)> {
    track
        .clips()
        .iter()
        .map(|c| (c.start.as_seconds(), c.duration.as_seconds()))
        .collect()
}
