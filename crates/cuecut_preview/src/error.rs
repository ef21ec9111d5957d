use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("timeline is empty, nothing to play")]
    NothingToPlay,

    #[error("playback needs a running tokio runtime")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, PreviewError>;
