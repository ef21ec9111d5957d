use cuecut_core::{MediaItem, MediaKind, MediaRef, TimeUs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{RenderError, Result};
use crate::validate::CandidateFile;

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Decodes media metadata. Only the duration matters to the timeline.
pub trait MediaProbe: Send + Sync {
    fn probe_duration(&self, path: &Path, kind: MediaKind) -> Result<TimeUs>;
}

/// Probe backed by the `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: PathBuf,
}

impl FfprobeProbe {
    pub fn new() -> Self {
        Self::with_program("ffprobe")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaProbe for FfprobeProbe {
    fn probe_duration(&self, path: &Path, kind: MediaKind) -> Result<TimeUs> {
        if !path.exists() {
            return Err(RenderError::FileNotFound(path.to_path_buf()));
        }

        let output = std::process::Command::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|e| RenderError::FfprobeExec(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(metadata_error(path, stderr.trim()));
        }

        let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| metadata_error(path, &e.to_string()))?;
        parse_probe_output(&probe, path, kind)
    }
}

/// A file that could not be turned into a timeline item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of probing a batch. Items keep the input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    pub items: Vec<MediaItem>,
    pub failures: Vec<ProbeFailure>,
}

/// Probe every file; a failing file is reported and never aborts the batch.
pub fn probe_batch(probe: &dyn MediaProbe, files: &[CandidateFile]) -> ProbeReport {
    let results = files
        .iter()
        .map(|file| probe_one(probe, file))
        .collect::<Vec<_>>();
    collect_report(files, results)
}

/// [`probe_batch`] on tokio's blocking pool. All probes finish before the
/// report is returned, so the caller inserts the whole batch in one step.
pub async fn probe_batch_async(probe: Arc<dyn MediaProbe>, files: Vec<CandidateFile>) -> ProbeReport {
    let handles: Vec<_> = files
        .iter()
        .cloned()
        .map(|file| {
            let probe = Arc::clone(&probe);
            tokio::task::spawn_blocking(move || probe_one(probe.as_ref(), &file))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(RenderError::FfprobeExec(format!("probe task failed: {e}"))),
        };
        results.push(result);
    }
    collect_report(&files, results)
}

/// Playable `file://` URL for a local path.
pub fn media_url(path: &Path) -> String {
    let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let raw = absolute.to_string_lossy().replace('\\', "/");
    let encoded: String = raw
        .chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '#' => "%23".to_string(),
            '?' => "%3F".to_string(),
            '%' => "%25".to_string(),
            c => c.to_string(),
        })
        .collect();
    if encoded.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn probe_one(probe: &dyn MediaProbe, file: &CandidateFile) -> Result<MediaItem> {
    let duration = probe.probe_duration(&file.path, file.kind)?;
    let name = file
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());
    Ok(MediaItem::new(
        file.kind,
        MediaRef {
            name,
            url: media_url(&file.path),
            path: file.path.clone(),
            source_duration: duration,
        },
    ))
}

fn collect_report(files: &[CandidateFile], results: Vec<Result<MediaItem>>) -> ProbeReport {
    let mut report = ProbeReport::default();
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(item) => report.items.push(item),
            Err(e) => {
                tracing::warn!(path = %file.path.display(), error = %e, "probe failed");
                report.failures.push(ProbeFailure {
                    path: file.path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    tracing::debug!(
        probed = report.items.len(),
        failed = report.failures.len(),
        "probe batch finished"
    );
    report
}

/// Longest media duration accepted from ffprobe: one week.
const MAX_PROBED_SECONDS: f64 = 7.0 * 24.0 * 3600.0;

fn parse_probe_output(probe: &FfprobeOutput, path: &Path, kind: MediaKind) -> Result<TimeUs> {
    let wanted = kind.to_string();
    if !probe.streams.iter().any(|s| s.codec_type == wanted) {
        return Err(metadata_error(path, &format!("no {wanted} stream")));
    }

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0 && *d <= MAX_PROBED_SECONDS)
        .map(TimeUs::from_seconds)
        .ok_or_else(|| metadata_error(path, "missing or invalid duration"))?;
    Ok(duration)
}

fn metadata_error(path: &Path, reason: &str) -> RenderError {
    RenderError::Metadata {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeProbe(HashMap<PathBuf, f64>);

    impl MediaProbe for FakeProbe {
        fn probe_duration(&self, path: &Path, _kind: MediaKind) -> Result<TimeUs> {
            self.0
                .get(path)
                .map(|s| TimeUs::from_seconds(*s))
                .ok_or_else(|| metadata_error(path, "unreadable"))
        }
    }

    fn candidate(path: &str, kind: MediaKind) -> CandidateFile {
        CandidateFile {
            path: PathBuf::from(path),
            kind,
            size: 1,
        }
    }

    fn fake() -> FakeProbe {
        FakeProbe(HashMap::from([
            (PathBuf::from("/m/a.mp4"), 10.0),
            (PathBuf::from("/m/music.mp3"), 30.0),
            (PathBuf::from("/m/b.mp4"), 5.0),
        ]))
    }

    fn parse(json: &str, kind: MediaKind) -> Result<TimeUs> {
        let output: FfprobeOutput = serde_json::from_str(json).unwrap();
        parse_probe_output(&output, Path::new("/m/x"), kind)
    }

    #[test]
    fn parse_probe_output_video_and_audio() {
        let json = r#"{
            "streams": [
                { "codec_type": "video", "codec_name": "h264", "width": 1920 },
                { "codec_type": "audio", "codec_name": "aac" }
            ],
            "format": { "duration": "10.5" }
        }"#;
        assert_eq!(parse(json, MediaKind::Video).unwrap(), TimeUs::from_seconds(10.5));
        assert_eq!(parse(json, MediaKind::Audio).unwrap(), TimeUs::from_seconds(10.5));
    }

    #[test]
    fn parse_probe_output_requires_matching_stream() {
        let json = r#"{
            "streams": [{ "codec_type": "audio", "codec_name": "mp3" }],
            "format": { "duration": "180.0" }
        }"#;
        assert_eq!(parse(json, MediaKind::Audio).unwrap(), TimeUs::from_seconds(180.0));
        assert!(matches!(
            parse(json, MediaKind::Video),
            Err(RenderError::Metadata { .. })
        ));
    }

    #[test]
    fn parse_probe_output_rejects_bad_duration() {
        for duration in [r#"{}"#, r#"{ "duration": "N/A" }"#, r#"{ "duration": "0" }"#, r#"{ "duration": "1e300" }"#] {
            let json = format!(r#"{{ "streams": [{{ "codec_type": "video" }}], "format": {duration} }}"#);
            assert!(matches!(
                parse(&json, MediaKind::Video),
                Err(RenderError::Metadata { .. })
            ));
        }
    }

    #[test]
    fn probe_nonexistent_file_returns_error() {
        let result = FfprobeProbe::new().probe_duration(
            Path::new("/tmp/does_not_exist_cuecut_probe_test.mp4"),
            MediaKind::Video,
        );
        assert!(matches!(result, Err(RenderError::FileNotFound(_))));
    }

    #[test]
    fn batch_keeps_going_past_failures() {
        let files = vec![
            candidate("/m/a.mp4", MediaKind::Video),
            candidate("/m/broken.mp4", MediaKind::Video),
            candidate("/m/music.mp3", MediaKind::Audio),
        ];
        let report = probe_batch(&fake(), &files);

        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].media.name, "a.mp4");
        assert_eq!(report.items[0].duration(), TimeUs::from_seconds(10.0));
        assert_eq!(report.items[1].kind, MediaKind::Audio);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, PathBuf::from("/m/broken.mp4"));
    }

    #[tokio::test]
    async fn async_batch_preserves_input_order() {
        let files = vec![
            candidate("/m/b.mp4", MediaKind::Video),
            candidate("/m/a.mp4", MediaKind::Video),
            candidate("/m/missing.wav", MediaKind::Audio),
        ];
        let report = probe_batch_async(Arc::new(fake()), files).await;

        let names: Vec<&str> = report.items.iter().map(|i| i.media.name.as_str()).collect();
        assert_eq!(names, vec!["b.mp4", "a.mp4"]);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn media_url_is_a_file_url() {
        assert_eq!(
            media_url(Path::new("/nonexistent/my clip.mp4")),
            "file:///nonexistent/my%20clip.mp4"
        );
    }
}
