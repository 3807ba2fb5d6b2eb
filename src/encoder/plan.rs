//! Bitrate and output-format planning for two-pass encoding.

use crate::error::PlanError;
use crate::job::EncodeRequest;
use crate::media::SourceMediaInfo;

/// Audio bitrate reserved out of the size budget, in kbps.
pub const AUDIO_BITRATE_KBPS: u32 = 128;

/// Everything the two encoder passes need, computed once per job.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodePlan {
    /// Video bitrate in kbps, always positive.
    pub video_bitrate_kbps: u64,
    /// Audio bitrate in kbps.
    pub audio_bitrate_kbps: u32,
    /// Encode width in pixels.
    pub output_width: u32,
    /// Encode height in pixels.
    pub output_height: u32,
    /// Encode frame rate, capped at the source rate.
    pub output_fps: f64,
}

impl EncodePlan {
    /// The `-vf` scale filter expression for both passes.
    pub fn scale_filter(&self) -> String {
        format!("scale={}:{}", self.output_width, self.output_height)
    }
}

/// Computes the encode plan from a request and the probed source info.
///
/// Pure and deterministic. The video bitrate is the target size spread over
/// the clip duration minus the fixed audio reservation; a target too small
/// to leave any video bitrate is rejected here, before ffmpeg is ever
/// spawned, instead of handing the encoder a non-positive rate.
pub fn plan(request: &EncodeRequest, info: &SourceMediaInfo) -> Result<EncodePlan, PlanError> {
    let target_bits_total = request.target_size_mb * 1024.0 * 1024.0 * 8.0;
    let target_bitrate_bps = target_bits_total / info.duration_secs;
    let audio_bitrate_bps = f64::from(AUDIO_BITRATE_KBPS) * 1024.0;
    let video_bitrate_bps = target_bitrate_bps - audio_bitrate_bps;

    let video_bitrate_kbps = (video_bitrate_bps / 1000.0) as i64;
    if video_bitrate_kbps <= 0 {
        return Err(PlanError::TargetTooSmall {
            target_size_mb: request.target_size_mb,
            duration_secs: info.duration_secs,
            audio_bitrate_kbps: AUDIO_BITRATE_KBPS,
        });
    }

    let scale = f64::from(request.scale_percent) / 100.0;
    let output_width = (f64::from(info.width) * scale) as u32;
    let output_height = (f64::from(info.height) * scale) as u32;

    // Never upscale the frame rate above the source.
    let output_fps = f64::from(request.target_fps).min(info.fps);

    Ok(EncodePlan {
        video_bitrate_kbps: video_bitrate_kbps as u64,
        audio_bitrate_kbps: AUDIO_BITRATE_KBPS,
        output_width,
        output_height,
        output_fps,
    })
}
