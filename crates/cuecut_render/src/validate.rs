//! Import gate: which files may enter the timeline at all.

use cuecut_core::{EditorConfig, MediaKind};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "webm", "mov", "avi", "mkv"];
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "aac", "ogg", "m4a"];

/// A file that passed validation, with the kind its extension implies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum RejectReason {
    #[error("unsupported file format .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("file size too large: {}, maximum allowed: {}", readable(.size), readable(.limit))]
    TooLarge { size: u64, limit: u64 },

    #[error("batch would exceed {} in total", readable(.limit))]
    BatchTooLarge { limit: u64 },

    #[error("unreadable: {0}")]
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub path: PathBuf,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub accepted: Vec<CandidateFile>,
    pub rejected: Vec<Rejection>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// One message covering every rejected file, or `None` when nothing was
    /// rejected.
    pub fn summary(&self) -> Option<String> {
        if self.rejected.is_empty() {
            return None;
        }
        let mut out = match self.rejected.len() {
            1 => "1 file could not be imported:\n".to_string(),
            n => format!("{n} files could not be imported:\n"),
        };
        for rejection in &self.rejected {
            out.push_str(&format!(
                "  {}: {}\n",
                display_name(&rejection.path),
                rejection.reason
            ));
        }
        out.push_str(&format!(
            "Supported formats: {}",
            VIDEO_EXTENSIONS
                .iter()
                .chain(AUDIO_EXTENSIONS.iter())
                .copied()
                .collect::<Vec<_>>()
                .join(", ")
        ));
        Some(out)
    }
}

/// Media kind implied by the file extension, case-insensitive.
pub fn media_kind(path: &Path) -> Option<MediaKind> {
    let ext = extension(path);
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Audio)
    } else {
        None
    }
}

/// Validate files on disk, reading their sizes from the filesystem.
pub fn validate_batch(paths: &[PathBuf], config: &EditorConfig) -> ValidationReport {
    let mut sized = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => sized.push((path.clone(), meta.len())),
            Ok(_) => unreadable.push(Rejection {
                path: path.clone(),
                reason: RejectReason::Unreadable("not a regular file".into()),
            }),
            Err(e) => unreadable.push(Rejection {
                path: path.clone(),
                reason: RejectReason::Unreadable(e.to_string()),
            }),
        }
    }

    let mut report = validate_sizes(&sized, config);
    report.rejected.extend(unreadable);
    report
}

/// Validate `(path, size)` pairs in order. Files are accepted until the batch
/// limit would be crossed; anything after that point is rejected.
pub fn validate_sizes(files: &[(PathBuf, u64)], config: &EditorConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut total: u64 = 0;

    for (path, size) in files {
        let reason = match media_kind(path) {
            None => Some(RejectReason::UnsupportedFormat {
                extension: extension(path),
            }),
            Some(_) if *size > config.max_file_size => Some(RejectReason::TooLarge {
                size: *size,
                limit: config.max_file_size,
            }),
            Some(_) if total + size > config.max_total_size => Some(RejectReason::BatchTooLarge {
                limit: config.max_total_size,
            }),
            Some(kind) => {
                total += size;
                report.accepted.push(CandidateFile {
                    path: path.clone(),
                    kind,
                    size: *size,
                });
                None
            }
        };
        if let Some(reason) = reason {
            tracing::warn!(path = %path.display(), %reason, "file rejected");
            report.rejected.push(Rejection {
                path: path.clone(),
                reason,
            });
        }
    }
    report
}

/// Human-readable size in binary units, e.g. `1.5 KB` or `500 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

fn readable(bytes: &u64) -> String {
    format_file_size(*bytes)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MIB: u64 = 1024 * 1024;

    fn files(entries: &[(&str, u64)]) -> Vec<(PathBuf, u64)> {
        entries
            .iter()
            .map(|(name, size)| (PathBuf::from(name), *size))
            .collect()
    }

    #[test]
    fn kind_comes_from_extension() {
        assert_eq!(media_kind(Path::new("clip.MP4")), Some(MediaKind::Video));
        assert_eq!(media_kind(Path::new("take.mkv")), Some(MediaKind::Video));
        assert_eq!(media_kind(Path::new("song.m4a")), Some(MediaKind::Audio));
        assert_eq!(media_kind(Path::new("photo.png")), None);
        assert_eq!(media_kind(Path::new("README")), None);
    }

    #[test]
    fn rejects_unsupported_and_oversized_files() {
        let config = EditorConfig::default();
        let report = validate_sizes(
            &files(&[
                ("a.mp4", 10 * MIB),
                ("notes.txt", 1),
                ("huge.mov", 600 * MIB),
                ("b.wav", 5 * MIB),
            ]),
            &config,
        );

        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.accepted[0].kind, MediaKind::Video);
        assert_eq!(report.accepted[1].kind, MediaKind::Audio);
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::UnsupportedFormat {
                extension: "txt".into()
            }
        );
        assert!(matches!(report.rejected[1].reason, RejectReason::TooLarge { .. }));
    }

    #[test]
    fn batch_limit_rejects_files_past_the_cap() {
        let config = EditorConfig::default();
        let report = validate_sizes(
            &files(&[
                ("1.mp4", 500 * MIB),
                ("2.mp4", 500 * MIB),
                ("3.mp4", 500 * MIB),
                ("4.mp4", 500 * MIB),
                ("5.mp4", 500 * MIB),
                ("small.mp3", MIB),
            ]),
            &config,
        );

        // 4 x 500 MiB + 1 MiB still fits inside 2 GiB
        assert_eq!(report.accepted.len(), 5);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].path, PathBuf::from("5.mp4"));
        assert!(matches!(
            report.rejected[0].reason,
            RejectReason::BatchTooLarge { .. }
        ));
    }

    #[test]
    fn summary_lists_every_rejection() {
        let config = EditorConfig::default();
        let clean = validate_sizes(&files(&[("a.mp4", 1)]), &config);
        assert!(clean.is_clean());
        assert!(clean.summary().is_none());

        let report = validate_sizes(&files(&[("a.gif", 1), ("dir/b.doc", 1)]), &config);
        let summary = report.summary().unwrap();
        assert!(summary.starts_with("2 files could not be imported"));
        assert!(summary.contains("a.gif: unsupported file format .gif"));
        assert!(summary.contains("b.doc: unsupported file format .doc"));
        assert!(summary.ends_with("Supported formats: mp4, webm, mov, avi, mkv, mp3, wav, aac, ogg, m4a"));
    }

    #[test]
    fn validate_batch_reads_sizes_from_disk() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("clip.webm");
        std::fs::write(&clip, vec![0u8; 2048]).unwrap();
        let missing = dir.path().join("gone.mp4");

        let report = validate_batch(&[clip.clone(), missing.clone()], &EditorConfig::default());
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.accepted[0].path, clip);
        assert_eq!(report.accepted[0].size, 2048);
        assert_eq!(report.rejected[0].path, missing);
        assert!(matches!(report.rejected[0].reason, RejectReason::Unreadable(_)));
    }

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(500 * MIB), "500 MB");
        assert_eq!(format_file_size(2 * 1024 * MIB), "2 GB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
    }

    #[test]
    fn too_large_message_uses_readable_sizes() {
        let reason = RejectReason::TooLarge {
            size: 600 * MIB,
            limit: 500 * MIB,
        };
        assert_eq!(
            reason.to_string(),
            "file size too large: 600 MB, maximum allowed: 500 MB"
        );
    }
}
