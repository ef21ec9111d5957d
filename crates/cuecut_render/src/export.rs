use crate::error::{RenderError, Result};
use cuecut_core::{Clip, ClipContent, Timeline, TimeUs, TrackKind};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Output format target for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
    pub vcodec: &'static str,
    pub crf: u8,
}

pub static PRESETS: [ExportPreset; 4] = [
    ExportPreset {
        id: "shorts",
        name: "YouTube Shorts",
        width: 1080,
        height: 1920,
        vcodec: "libx264",
        crf: 23,
    },
    ExportPreset {
        id: "reels",
        name: "TikTok / Instagram Reels",
        width: 1080,
        height: 1920,
        vcodec: "libx264",
        crf: 23,
    },
    ExportPreset {
        id: "hd",
        name: "Standard HD 1080p",
        width: 1920,
        height: 1080,
        vcodec: "libx264",
        crf: 20,
    },
    ExportPreset {
        id: "4k",
        name: "4K",
        width: 3840,
        height: 2160,
        vcodec: "libx264",
        crf: 20,
    },
];

impl ExportPreset {
    /// Look a preset up by id, case-insensitive.
    pub fn find(id: &str) -> Option<&'static ExportPreset> {
        PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
    }
}

/// A compiled export plan ready for ffmpeg execution.
#[derive(Debug, Clone, Serialize)]
pub struct ExportPlan {
    pub inputs: Vec<ExportInput>,
    pub filter_graph: String,
    pub output_args: Vec<String>,
    pub output_path: PathBuf,
    pub total_duration: TimeUs,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportInput {
    pub path: PathBuf,
    pub index: usize,
}

/// Progress update during an export.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportProgress {
    pub percent: f64,
    pub frame: u64,
    pub fps: f64,
    pub speed: String,
    pub eta_seconds: Option<f64>,
}

/// Compile a timeline into an ffmpeg export plan.
///
/// Video clips are concatenated in time order and fitted to the preset frame.
/// Holes on the video track are filled with black frames and silence so the
/// output keeps timeline time. Audio clips are delayed to their timeline
/// offsets and mixed over the video sound. Text clips are burned in over their
/// interval.
pub fn compile(timeline: &Timeline, preset: &ExportPreset, output: impl AsRef<Path>) -> Result<ExportPlan> {
    let (video_clips, audio_clips): (Vec<&Clip>, Vec<&Clip>) =
        timeline.media_clips().into_iter().partition(|c| c.is_video());
    if video_clips.is_empty() {
        return Err(RenderError::NoClips);
    }

    let mut text_clips: Vec<&Clip> = timeline.clips_of(TrackKind::Text).collect();
    text_clips.sort_by(|a, b| a.cmp_start(b));

    // Deduplicate inputs by media path
    let mut path_to_index: HashMap<PathBuf, usize> = HashMap::new();
    let mut inputs: Vec<ExportInput> = Vec::new();
    for clip in video_clips.iter().chain(audio_clips.iter()) {
        if let Some(media) = clip.media() {
            path_to_index.entry(media.path.clone()).or_insert_with(|| {
                let idx = inputs.len();
                inputs.push(ExportInput {
                    path: media.path.clone(),
                    index: idx,
                });
                idx
            });
        }
    }
    let input_of = |clip: &Clip| -> usize {
        clip.media()
            .and_then(|m| path_to_index.get(&m.path).copied())
            .unwrap_or_default()
    };

    let (w, h) = (preset.width, preset.height);
    let mut filters: Vec<String> = Vec::new();
    let mut segments: Vec<String> = Vec::new();
    let mut cursor = TimeUs::ZERO;
    let mut gaps = 0;

    for (i, clip) in video_clips.iter().enumerate() {
        if clip.start > cursor {
            let g = (clip.start - cursor).as_seconds();
            filters.push(format!("color=c=black:s={w}x{h}:d={g},setsar=1[gv{gaps}]"));
            filters.push(format!(
                "anullsrc=channel_layout=stereo:sample_rate=48000,atrim=duration={g}[ga{gaps}]"
            ));
            segments.push(format!("[gv{gaps}][ga{gaps}]"));
            gaps += 1;
        }
        cursor = cursor.max(clip.end());

        let idx = input_of(*clip);
        let d = clip.duration.as_seconds();
        filters.push(format!(
            "[{idx}:v]trim=duration={d},setpts=PTS-STARTPTS,scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1[v{i}]"
        ));
        filters.push(format!(
            "[{idx}:a]atrim=duration={d},asetpts=PTS-STARTPTS[a{i}]"
        ));
        segments.push(format!("[v{i}][a{i}]"));
    }

    let clip_count = video_clips.len();
    let segment_count = segments.len();
    let concat_inputs: String = segments.concat();
    let has_audio_overlay = !audio_clips.is_empty();
    let has_text = !text_clips.is_empty();
    let video_audio_out = if has_audio_overlay { "concat_a" } else { "outa" };
    let video_out_label = if has_text { "basev" } else { "outv" };

    filters.push(format!(
        "{concat_inputs}concat=n={segment_count}:v=1:a=1[{video_out_label}][{video_audio_out}]"
    ));

    if has_audio_overlay {
        for (i, clip) in audio_clips.iter().enumerate() {
            let idx = input_of(*clip);
            let d = clip.duration.as_seconds();
            let delay_ms = clip.start.0 / 1000;
            filters.push(format!(
                "[{idx}:a]atrim=duration={d},asetpts=PTS-STARTPTS,adelay={delay_ms}|{delay_ms}[ovla{i}]"
            ));
        }

        let amix_inputs: String = std::iter::once(format!("[{video_audio_out}]"))
            .chain((0..audio_clips.len()).map(|i| format!("[ovla{i}]")))
            .collect();
        let total_inputs = audio_clips.len() + 1;
        filters.push(format!(
            "{amix_inputs}amix=inputs={total_inputs}:duration=first:dropout_transition=0[outa]"
        ));
    }

    if has_text {
        let font_size = h / 24;
        let drawtext_chain = text_clips
            .iter()
            .filter_map(|clip| match &clip.content {
                ClipContent::Text { text, color } => {
                    let start_s = clip.start.as_seconds();
                    let end_s = clip.end().as_seconds();
                    let escaped = escape_drawtext(text);
                    let ffmpeg_color = color.strip_prefix('#').unwrap_or(color);
                    Some(format!(
                        "drawtext=text='{escaped}':fontsize={font_size}:fontcolor=0x{ffmpeg_color}:box=1:boxcolor=black@0.5:x=(w-text_w)/2:y=h-text_h-h/10:enable='between(t,{start_s},{end_s})'"
                    ))
                }
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(",");
        filters.push(format!("[{video_out_label}]{drawtext_chain}[outv]"));
    }

    let output_args = vec![
        "-map".to_string(),
        "[outv]".to_string(),
        "-map".to_string(),
        "[outa]".to_string(),
        "-c:v".to_string(),
        preset.vcodec.to_string(),
        "-crf".to_string(),
        preset.crf.to_string(),
        "-preset".to_string(),
        "ultrafast".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
    ];

    tracing::debug!(
        inputs = inputs.len(),
        videos = clip_count,
        gaps,
        audios = audio_clips.len(),
        texts = text_clips.len(),
        preset = preset.id,
        "export plan compiled"
    );

    Ok(ExportPlan {
        inputs,
        filter_graph: filters.join(";"),
        output_args,
        output_path: output.as_ref().to_path_buf(),
        total_duration: timeline.total_duration(),
    })
}

/// Build ffmpeg args from an export plan.
pub fn build_ffmpeg_args(plan: &ExportPlan) -> Vec<String> {
    let mut args = vec!["-y".to_string()];

    for input in &plan.inputs {
        args.push("-i".to_string());
        args.push(input.path.to_string_lossy().to_string());
    }

    args.push("-filter_complex".to_string());
    args.push(plan.filter_graph.clone());

    args.extend(plan.output_args.iter().cloned());

    args.push(plan.output_path.to_string_lossy().to_string());

    args
}

/// Execute an export plan by spawning ffmpeg.
/// Sends progress updates via the channel.
pub async fn execute(
    plan: &ExportPlan,
    progress_tx: tokio::sync::watch::Sender<ExportProgress>,
) -> Result<()> {
    use std::process::Stdio;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::process::Command;

    let args = build_ffmpeg_args(plan);
    tracing::info!(output = %plan.output_path.display(), "export started");

    let mut child = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RenderError::FfmpegNotFound
            } else {
                RenderError::Io(e)
            }
        })?;

    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RenderError::FfmpegFailed("stderr was not captured".into()))?;
    // ffmpeg ends progress lines with '\r'
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();
    let mut tail = String::new();

    let total_secs = plan.total_duration.as_seconds();

    while reader.read_until(b'\r', &mut buf).await? > 0 {
        let chunk = String::from_utf8_lossy(&buf).into_owned();
        buf.clear();
        for line in chunk.split(['\r', '\n']).filter(|l| !l.trim().is_empty()) {
            if let Some(progress) = parse_progress(line, total_secs) {
                let _ = progress_tx.send(progress);
            } else {
                tail = line.trim().to_string();
            }
        }
    }

    let status = child.wait().await.map_err(RenderError::Io)?;
    if !status.success() {
        return Err(RenderError::FfmpegFailed(format!(
            "ffmpeg exited with {status}: {tail}"
        )));
    }

    let last = progress_tx.borrow().clone();
    let _ = progress_tx.send(ExportProgress {
        percent: 100.0,
        eta_seconds: None,
        ..last
    });
    tracing::info!(output = %plan.output_path.display(), "export finished");
    Ok(())
}

/// Parse an ffmpeg stderr progress line.
///
/// Example line: `frame=  123 fps= 60 ... time=00:01:02.05 speed=1.50x`
pub fn parse_progress(line: &str, total_secs: f64) -> Option<ExportProgress> {
    if !line.contains("time=") {
        return None;
    }

    let frame = extract_value(line, "frame=")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    let fps = extract_value(line, "fps=")
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0);

    let speed = extract_value(line, "speed=").unwrap_or_default();

    let time_secs = extract_value(line, "time=")
        .and_then(|v| parse_time_str(&v))
        .unwrap_or(0.0);

    let percent = if total_secs > 0.0 {
        (time_secs / total_secs * 100.0).min(100.0)
    } else {
        0.0
    };

    let speed_factor = speed
        .trim_end_matches('x')
        .parse::<f64>()
        .unwrap_or(0.0);

    let eta_seconds = (speed_factor > 0.0 && total_secs > time_secs)
        .then(|| (total_secs - time_secs) / speed_factor);

    Some(ExportProgress {
        percent,
        frame,
        fps,
        speed,
        eta_seconds,
    })
}

/// Escape text for a single-quoted drawtext value.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "'\\''")
        .replace(':', "\\:")
        .replace('%', "\\%")
}

/// Extract a value from an ffmpeg key=value progress line.
fn extract_value(line: &str, key: &str) -> Option<String> {
    let start = line.find(key)? + key.len();
    let trimmed = line[start..].trim_start();
    let end = trimmed
        .find(char::is_whitespace)
        .unwrap_or(trimmed.len());
    let val = &trimmed[..end];
    (!val.is_empty()).then(|| val.to_string())
}

/// Parse an ffmpeg time string like "00:01:02.05" into seconds.
fn parse_time_str(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours: f64 = parts[0].parse().ok()?;
    let mins: f64 = parts[1].parse().ok()?;
    let secs: f64 = parts[2].parse().ok()?;
    Some(hours * 3600.0 + mins * 60.0 + secs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
