pub mod config;
pub mod cues;
pub mod editing;
pub mod error;
pub mod playback;
pub mod session;
pub mod timeline;
pub mod types;

#[cfg(test)]
mod testutil;

pub use config::EditorConfig;
pub use editing::{Insertion, MediaItem};
pub use error::{CoreError, Result};
pub use session::EditorSession;
pub use types::*;
