use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to execute ffprobe: {0}")]
    FfprobeExec(String),

    #[error("could not read metadata for {path}: {reason}")]
    Metadata { path: PathBuf, reason: String },

    #[error("ffmpeg not found")]
    FfmpegNotFound,

    #[error("ffmpeg failed: {0}")]
    FfmpegFailed(String),

    #[error("no video clips to export")]
    NoClips,

    #[error("timeline has no duration; add video before generating cues")]
    NoDuration,

    #[error("cue generation failed after {attempts} attempts: {last}")]
    CueGeneration { attempts: u32, last: String },

    #[error(transparent)]
    Core(#[from] cuecut_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
