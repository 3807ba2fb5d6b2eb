//! Error types for the compression pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Any error a running job can hit; caught at the job boundary and
/// converted into a terminal failure event, never propagated raw.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("{0}")]
    Probe(#[from] ProbeError),

    #[error("{0}")]
    Plan(#[from] PlanError),

    #[error("{0}")]
    Encoder(#[from] EncoderError),
}

/// Request precondition errors, surfaced before any job is created.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Input file does not exist: '{}'", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Input path is not a file: '{}'", path.display())]
    InputNotAFile { path: PathBuf },

    #[error("Target size must be a positive number of megabytes, got {value}")]
    InvalidTargetSize { value: f64 },

    #[error("Resolution scale must be between {min}% and {max}%, got {value}%")]
    ScaleOutOfRange { value: u32, min: u32, max: u32 },

    #[error("Target frame rate must be at least 1 fps")]
    InvalidFrameRate,
}

/// Errors from the ffprobe adapter.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to run ffprobe: {0}")]
    SpawnFailed(String),

    #[error("ffprobe failed with exit code {code}: {stderr}")]
    ProbeFailed { code: i32, stderr: String },

    #[error("Failed to parse ffprobe output: {0}")]
    ParseFailed(String),
}

/// Bitrate planning errors.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error(
        "Target size {target_size_mb} MB is too small for a {duration_secs:.1}s clip: \
         no bitrate left for video after reserving {audio_bitrate_kbps} kbps for audio"
    )]
    TargetTooSmall {
        target_size_mb: f64,
        duration_secs: f64,
        audio_bitrate_kbps: u32,
    },
}

/// Encoding process errors.
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("Failed to spawn ffmpeg: {0}")]
    SpawnFailed(String),

    #[error("FFmpeg pass {pass} failed with exit code {code}: {stderr}")]
    PassFailed { pass: u32, code: i32, stderr: String },
}
