//! Boundary to the text model that writes script cues.

use cuecut_core::cues::parse_cues;
use cuecut_core::{EditorConfig, ScriptCue, TimeUs};
use std::future::Future;
use std::time::Duration;

use crate::error::{RenderError, Result};

/// Produces a raw cue list (model text) for a prompt and a timeline length.
pub trait CueGenerator: Send + Sync {
    fn generate(&self, prompt: &str, total_duration: TimeUs) -> impl Future<Output = Result<String>> + Send;
}

/// Ask `generator` for cues, retrying failed calls and unparseable answers.
///
/// Makes up to `config.ai_retry_attempts` calls. Attempt `n` waits
/// `config.ai_retry_delay() * 2^(n-1)` after failing.
pub async fn generate_cues_with_retry<G: CueGenerator>(
    generator: &G,
    prompt: &str,
    total_duration: TimeUs,
    config: &EditorConfig,
) -> Result<Vec<ScriptCue>> {
    if total_duration <= TimeUs::ZERO {
        return Err(RenderError::NoDuration);
    }

    let attempts = config.ai_retry_attempts.max(1);
    let base_delay = config.ai_retry_delay();
    let mut last = String::new();
    for attempt in 1..=attempts {
        let outcome = match generator.generate(prompt, total_duration).await {
            Ok(raw) => parse_cues(&raw, total_duration).map_err(RenderError::from),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(cues) => {
                tracing::info!(attempt, count = cues.len(), "cues generated");
                return Ok(cues);
            }
            Err(e) => {
                tracing::warn!(attempt, attempts, error = %e, "cue generation attempt failed");
                last = e.to_string();
                if attempt < attempts {
                    tokio::time::sleep(backoff(base_delay, attempt)).await;
                }
            }
        }
    }

    Err(RenderError::CueGeneration { attempts, last })
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1 << (attempt - 1).min(16))
}
