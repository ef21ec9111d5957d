pub mod clock;
pub mod error;
pub mod sync;

pub use clock::PlaybackClock;
pub use error::{PreviewError, Result};
pub use sync::{PlayerSync, SyncAction};
