use thiserror::Error;

use crate::types::TrackKind;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clip not found: {0}")]
    ClipNotFound(uuid::Uuid),

    #[error("Track not found: {0}")]
    TrackNotFound(uuid::Uuid),

    #[error("Cue not found: {0}")]
    CueNotFound(uuid::Uuid),

    #[error("Clip kind {clip:?} does not match track kind {track:?}")]
    KindMismatch { clip: TrackKind, track: TrackKind },

    #[error("Invalid clip: {0}")]
    InvalidClip(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Malformed cue response: {0}")]
    CueFormat(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
