//! Video duration probing and lossless size-bounded segmentation via the
//! external `ffprobe`/`ffmpeg` tools. Missing tooling is fatal for the
//! video file being processed, surfaced with the offending path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use tempfile::TempDir;
use tracing::info;

use docset_core::error::Error;

/// Fallback window when the average bitrate cannot be derived.
const FALLBACK_WINDOW_SECS: f64 = 5.0 * 60.0;
/// Never segment finer than this.
const MIN_WINDOW_SECS: f64 = 5.0;

/// Media duration in seconds, via `ffprobe`.
pub fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output();
    let output = match output {
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(Error::ToolMissing {
                tool: "ffprobe",
                path: path.to_path_buf(),
            }
            .into());
        }
        Err(err) => return Err(err.into()),
        Ok(out) => out,
    };
    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool: "ffprobe",
            path: path.to_path_buf(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
    raw.parse::<f64>().map_err(|_| {
        Error::ToolFailed {
            tool: "ffprobe",
            path: path.to_path_buf(),
            detail: format!("unparseable duration output '{}'", raw),
        }
        .into()
    })
}

/// Segment length targeting `limit_bytes` per piece from the file's average
/// bitrate, with a small safety factor. Falls back to a conservative fixed
/// window when the bitrate is unknown.
pub fn segment_window_secs(size_bytes: u64, duration: f64, limit_bytes: u64) -> f64 {
    if duration <= 0.0 {
        return FALLBACK_WINDOW_SECS;
    }
    let avg_bitrate = size_bytes as f64 / duration;
    if !avg_bitrate.is_finite() || avg_bitrate <= 0.0 {
        return FALLBACK_WINDOW_SECS;
    }
    ((limit_bytes as f64 / avg_bitrate) * 0.98).max(MIN_WINDOW_SECS)
}

/// Split a video into segments at most `limit_bytes` each using the ffmpeg
/// stream-copy segmenter (no re-encode). Files already under the limit are
/// returned as-is with no temporary directory. The returned [`TempDir`]
/// owns the segment files; dropping it releases them on both success and
/// failure paths.
pub fn split_by_size(
    path: &Path,
    duration: f64,
    limit_bytes: u64,
) -> Result<(Vec<PathBuf>, Option<TempDir>)> {
    let size_bytes = std::fs::metadata(path)?.len();
    if size_bytes <= limit_bytes {
        return Ok((vec![path.to_path_buf()], None));
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    let suffix = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let tmpdir = tempfile::Builder::new()
        .prefix(&format!("{}_segments_", stem))
        .tempdir_in(parent)?;
    let pattern = tmpdir
        .path()
        .join(format!("{}_part_%03d{}", stem, suffix));

    let window = segment_window_secs(size_bytes, duration, limit_bytes);
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-i"])
        .arg(path)
        .args(["-c", "copy", "-map", "0", "-f", "segment"])
        .args(["-segment_time", &format!("{:.3}", window)])
        .args(["-reset_timestamps", "1"])
        .arg(&pattern)
        .status();
    let status = match status {
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(Error::ToolMissing {
                tool: "ffmpeg",
                path: path.to_path_buf(),
            }
            .into());
        }
        Err(err) => return Err(err.into()),
        Ok(status) => status,
    };
    if !status.success() {
        return Err(Error::ToolFailed {
            tool: "ffmpeg",
            path: path.to_path_buf(),
            detail: format!("segmenter exited with {}", status),
        }
        .into());
    }

    let prefix = format!("{}_part_", stem);
    let mut segments: Vec<PathBuf> = std::fs::read_dir(tmpdir.path())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with(&prefix))
                .unwrap_or(false)
        })
        .collect();
    segments.sort();
    if segments.is_empty() {
        return Err(Error::ToolFailed {
            tool: "ffmpeg",
            path: path.to_path_buf(),
            detail: "segmenter produced no output files".to_string(),
        }
        .into());
    }
    info!(
        segments = segments.len(),
        window_secs = window,
        "video split into size-bounded segments"
    );
    Ok((segments, Some(tmpdir)))
}
