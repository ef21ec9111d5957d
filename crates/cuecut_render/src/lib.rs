pub mod cues;
pub mod error;
pub mod export;
pub mod probe;
pub mod validate;

pub use error::{RenderError, Result};
