use crate::error::Result;
use crate::playback::{CUE_TOLERANCE, RESYNC_THRESHOLD};
use crate::types::TimeUs;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Editor tunables. Every key is optional in the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Length of a text clip promoted from a script cue.
    pub default_text_duration: TimeUs,
    pub cue_tolerance: TimeUs,
    pub resync_threshold: TimeUs,
    pub tick_interval_ms: u64,
    /// Per-file import limit in bytes.
    pub max_file_size: u64,
    /// Limit for one import batch in bytes.
    pub max_total_size: u64,
    pub ai_retry_attempts: u32,
    pub ai_retry_delay_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_text_duration: TimeUs::from_seconds(4.0),
            cue_tolerance: CUE_TOLERANCE,
            resync_threshold: RESYNC_THRESHOLD,
            tick_interval_ms: 100,
            max_file_size: 500 * 1024 * 1024,
            max_total_size: 2 * 1024 * 1024 * 1024,
            ai_retry_attempts: 3,
            ai_retry_delay_ms: 1_000,
        }
    }
}

impl EditorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn ai_retry_delay(&self) -> Duration {
        Duration::from_millis(self.ai_retry_delay_ms)
    }

    /// Save as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from a JSON file; absent keys keep their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: EditorConfig = serde_json::from_str(&data)?;
        tracing::debug!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }
}
