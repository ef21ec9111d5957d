use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cuecut_core::{EditorConfig, EditorSession, TimeUs};
use cuecut_preview::{PlaybackClock, PlayerSync, SyncAction};
use cuecut_render::export::{self, ExportPreset, ExportProgress, PRESETS};
use cuecut_render::probe::{probe_batch_async, FfprobeProbe, MediaProbe};
use cuecut_render::validate::validate_batch;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cuecut", version, about = "Multi-track timeline editor with script cues")]
struct Cli {
    /// JSON file with editor settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import media and print the resulting timeline
    Inspect {
        files: Vec<PathBuf>,
        /// Playhead position in seconds for the active-clip report
        #[arg(long)]
        time: Option<f64>,
    },
    /// Import media, then apply a cue list produced by a text model
    Cues {
        /// Raw model response containing the cue array
        #[arg(long)]
        response: PathBuf,
        files: Vec<PathBuf>,
        /// Turn every cue into a text clip at its time
        #[arg(long)]
        promote: bool,
    },
    /// Import media and play the full timeline on the wall clock
    Play { files: Vec<PathBuf> },
    /// Import media and export a stitched rendition with ffmpeg
    Export {
        files: Vec<PathBuf>,
        #[arg(long, default_value = "hd")]
        preset: String,
        #[arg(long, short)]
        output: PathBuf,
        /// Print the ffmpeg command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Inspect { files, time } => inspect(config, &files, time).await,
        Command::Cues {
            response,
            files,
            promote,
        } => apply_cues(config, &response, &files, promote).await,
        Command::Play { files } => play(config, &files).await,
        Command::Export {
            files,
            preset,
            output,
            dry_run,
        } => run_export(config, &files, &preset, &output, dry_run).await,
    }
}

async fn inspect(config: EditorConfig, files: &[PathBuf], time: Option<f64>) -> Result<()> {
    let mut session = import(config, files).await?;
    if let Some(t) = time {
        session.seek(TimeUs::from_seconds(t));
    }
    print_json(&session.snapshot())?;
    print_json(&session.active())?;
    Ok(())
}

async fn apply_cues(config: EditorConfig, response: &Path, files: &[PathBuf], promote: bool) -> Result<()> {
    let mut session = import(config, files).await?;
    let raw = std::fs::read_to_string(response)
        .with_context(|| format!("reading {}", response.display()))?;
    let cues = cuecut_core::cues::parse_cues(&raw, session.total_duration())
        .context("parsing cue response")?;
    session.set_cues(cues);

    if promote {
        let pending: Vec<_> = session.cues().iter().map(|c| (c.id, c.time)).collect();
        for (cue_id, at) in pending {
            session.seek(at);
            session.promote_cue(cue_id)?;
        }
    }
    print_json(&session.cues())?;
    print_json(&session.snapshot())?;
    Ok(())
}

async fn play(config: EditorConfig, files: &[PathBuf]) -> Result<()> {
    let clock = PlaybackClock::new(config.tick_interval());
    let mut sync = PlayerSync::new(config.resync_threshold);
    let mut session = import(config, files).await?;
    let total = session.total_duration();

    let mut ticks = clock.subscribe();
    clock.start(total)?;
    let mut last_cue = None;

    loop {
        tokio::select! {
            changed = ticks.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                clock.stop();
                break;
            }
        }

        let now = *ticks.borrow_and_update();
        session.seek(now);
        let active = session.active();

        // an ideal player sits exactly at the clip offset
        let position = active
            .clips
            .video
            .and_then(|c| c.local_offset(now))
            .unwrap_or(TimeUs::ZERO);
        match sync.reconcile(active.clips.video, now, position) {
            SyncAction::Load { url, offset, .. } => {
                tracing::info!(at = %now, %url, %offset, "video clip");
            }
            SyncAction::Unload => tracing::info!(at = %now, "no video"),
            _ => {}
        }

        let cue_id = active.cue.map(|c| c.id);
        if cue_id != last_cue {
            if let Some(cue) = active.cue {
                tracing::info!(at = %now, text = %cue.text, "cue");
            }
            last_cue = cue_id;
        }

        if now >= total {
            break;
        }
    }

    println!("played {} of {}", session.current_time(), total);
    Ok(())
}

async fn run_export(
    config: EditorConfig,
    files: &[PathBuf],
    preset: &str,
    output: &Path,
    dry_run: bool,
) -> Result<()> {
    let preset = ExportPreset::find(preset).with_context(|| {
        let known: Vec<&str> = PRESETS.iter().map(|p| p.id).collect();
        format!("unknown preset {preset:?}; available: {}", known.join(", "))
    })?;
    let session = import(config, files).await?;
    let plan = export::compile(session.timeline(), preset, output)?;

    if dry_run {
        let args = export::build_ffmpeg_args(&plan);
        let quoted: Vec<String> = args.iter().map(|a| shell_quote(a)).collect();
        println!("ffmpeg {}", quoted.join(" "));
        return Ok(());
    }

    require("ffmpeg")?;
    let (progress_tx, mut progress_rx) = tokio::sync::watch::channel(ExportProgress::default());
    let reporter = tokio::spawn(async move {
        while progress_rx.changed().await.is_ok() {
            let progress = progress_rx.borrow_and_update().clone();
            eprint!("\r{:5.1}%  speed {}", progress.percent, progress.speed);
        }
        eprintln!();
    });

    let result = export::execute(&plan, progress_tx).await;
    let _ = reporter.await;
    result?;
    println!("exported {} ({})", plan.output_path.display(), preset.name);
    Ok(())
}

/// Validate, probe and insert `files` as one batch into a fresh session.
async fn import(config: EditorConfig, files: &[PathBuf]) -> Result<EditorSession> {
    let validation = validate_batch(files, &config);
    if let Some(summary) = validation.summary() {
        eprintln!("{summary}");
    }

    let mut session = EditorSession::new(config);
    if validation.accepted.is_empty() {
        return Ok(session);
    }

    require("ffprobe")?;
    let probe: Arc<dyn MediaProbe> = Arc::new(FfprobeProbe::new());
    let report = probe_batch_async(probe, validation.accepted).await;
    for failure in &report.failures {
        eprintln!("skipped {}: {}", failure.path.display(), failure.reason);
    }

    let inserted = session.import(&report.items);
    tracing::info!(
        clips = inserted.len(),
        total = %session.total_duration(),
        "import finished"
    );
    Ok(session)
}

fn require(bin: &str) -> Result<()> {
    let found = std::process::Command::new(bin)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok();
    if !found {
        bail!("{bin} is required but was not found on PATH (install ffmpeg, e.g. `sudo apt install ffmpeg`)");
    }
    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn shell_quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+".contains(c))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}
