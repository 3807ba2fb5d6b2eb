//! FFprobe wrapper for source media analysis.

use std::path::Path;
use std::process::Stdio;

use serde::Serialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::ProbeError;

/// Metadata of a source file, probed once per job and read-only after.
#[derive(Debug, Clone, Serialize)]
pub struct SourceMediaInfo {
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Frame rate in frames per second.
    pub fps: f64,
}

/// Probes duration, dimensions, and frame rate of a media file.
///
/// Runs ffprobe twice: once against the container format for the duration,
/// once against the first video stream for width/height/frame rate. Each
/// invocation blocks the calling task until the process exits.
pub async fn probe(path: &Path) -> Result<SourceMediaInfo, ProbeError> {
    let duration_out = run_ffprobe(
        &["-v", "error", "-show_entries", "format=duration"],
        path,
    )
    .await?;
    let duration_secs = parse_duration(&duration_out)?;

    let stream_out = run_ffprobe(
        &[
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
        ],
        path,
    )
    .await?;
    let (width, height, fps) = parse_stream_fields(&stream_out)?;

    let info = SourceMediaInfo {
        duration_secs,
        width,
        height,
        fps,
    };
    debug!(?info, "Probed source file");
    Ok(info)
}

/// Runs ffprobe with key-less single-value output and returns its stdout.
async fn run_ffprobe(entries: &[&str], path: &Path) -> Result<String, ProbeError> {
    let output = Command::new("ffprobe")
        .args(entries)
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| ProbeError::SpawnFailed(e.to_string()))?;

    if !output.status.success() {
        return Err(ProbeError::ProbeFailed {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Parses the duration probe output: one decimal seconds value.
fn parse_duration(output: &str) -> Result<f64, ProbeError> {
    let value = output.trim();
    let duration: f64 = value
        .parse()
        .map_err(|_| ProbeError::ParseFailed(format!("bad duration '{value}'")))?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ProbeError::ParseFailed(format!(
            "non-positive duration '{value}'"
        )));
    }
    Ok(duration)
}

/// Parses the stream probe output: width, height, and frame rate on
/// three lines, the frame rate as a rational like "30000/1001".
fn parse_stream_fields(output: &str) -> Result<(u32, u32, f64), ProbeError> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());

    let width: u32 = lines
        .next()
        .ok_or_else(|| ProbeError::ParseFailed("missing width".to_string()))?
        .parse()
        .map_err(|_| ProbeError::ParseFailed("bad width".to_string()))?;
    let height: u32 = lines
        .next()
        .ok_or_else(|| ProbeError::ParseFailed("missing height".to_string()))?
        .parse()
        .map_err(|_| ProbeError::ParseFailed("bad height".to_string()))?;
    let rate = lines
        .next()
        .ok_or_else(|| ProbeError::ParseFailed("missing frame rate".to_string()))?;
    let fps = parse_rational_fps(rate)?;

    if width == 0 || height == 0 {
        return Err(ProbeError::ParseFailed(format!(
            "zero dimension {width}x{height}"
        )));
    }

    Ok((width, height, fps))
}

/// Parses a "numerator/denominator" frame rate into frames per second.
fn parse_rational_fps(rate: &str) -> Result<f64, ProbeError> {
    let (num, den) = rate
        .split_once('/')
        .ok_or_else(|| ProbeError::ParseFailed(format!("bad frame rate '{rate}'")))?;
    let num: f64 = num
        .parse()
        .map_err(|_| ProbeError::ParseFailed(format!("bad frame rate '{rate}'")))?;
    let den: f64 = den
        .parse()
        .map_err(|_| ProbeError::ParseFailed(format!("bad frame rate '{rate}'")))?;
    if den == 0.0 || num <= 0.0 {
        return Err(ProbeError::ParseFailed(format!(
            "degenerate frame rate '{rate}'"
        )));
    }
    Ok(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_duration() {
        assert_eq!(parse_duration("60.016000\n").unwrap(), 60.016);
    }

    #[test]
    fn rejects_garbage_duration() {
        assert!(matches!(
            parse_duration("N/A\n"),
            Err(ProbeError::ParseFailed(_))
        ));
        assert!(matches!(
            parse_duration("0.0"),
            Err(ProbeError::ParseFailed(_))
        ));
    }

    #[test]
    fn parses_stream_fields_in_order() {
        let (w, h, fps) = parse_stream_fields("1920\n1080\n30/1\n").unwrap();
        assert_eq!((w, h), (1920, 1080));
        assert_eq!(fps, 30.0);
    }

    #[test]
    fn parses_ntsc_rational_frame_rate() {
        let fps = parse_rational_fps("30000/1001").unwrap();
        assert!((fps - 29.97).abs() < 0.01);
    }

    #[test]
    fn rejects_truncated_stream_output() {
        assert!(matches!(
            parse_stream_fields("1920\n1080\n"),
            Err(ProbeError::ParseFailed(_))
        ));
    }

    #[test]
    fn rejects_zero_denominator() {
        assert!(matches!(
            parse_rational_fps("30/0"),
            Err(ProbeError::ParseFailed(_))
        ));
    }
}
