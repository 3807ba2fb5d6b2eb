//! FFmpeg subprocess wrapper for the two encoding passes.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::plan::EncodePlan;
use crate::error::EncoderError;

/// Null sink for the discarded pass-1 output.
fn null_sink() -> &'static str {
    if cfg!(windows) {
        "NUL"
    } else {
        "/dev/null"
    }
}

/// Runs the analysis pass: no audio, media output discarded, statistics
/// written to the two-pass log.
pub async fn run_pass_one(
    input: &Path,
    plan: &EncodePlan,
    log_prefix: &Path,
) -> Result<(), EncoderError> {
    let mut cmd = pass_command(input, plan, log_prefix, 1);
    cmd.arg("-an");
    cmd.args(["-f", "mp4"]).arg(null_sink());
    run_pass(cmd, 1).await
}

/// Runs the compressing pass: same filter and video bitrate as pass 1,
/// plus audio, writing the final output file.
pub async fn run_pass_two(
    input: &Path,
    output: &Path,
    plan: &EncodePlan,
    log_prefix: &Path,
) -> Result<(), EncoderError> {
    let mut cmd = pass_command(input, plan, log_prefix, 2);
    cmd.arg("-b:a")
        .arg(format!("{}k", plan.audio_bitrate_kbps));
    cmd.args(["-c:v", "libx264", "-c:a", "aac"]);
    cmd.arg(output);
    run_pass(cmd, 2).await
}

/// Builds the arguments shared by both passes.
fn pass_command(input: &Path, plan: &EncodePlan, log_prefix: &Path, pass: u32) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-y"); // Overwrite pass-1 null sink / allocated output
    cmd.arg("-i").arg(input);
    cmd.arg("-vf").arg(plan.scale_filter());
    cmd.arg("-r").arg(plan.output_fps.to_string());
    cmd.arg("-b:v")
        .arg(format!("{}k", plan.video_bitrate_kbps));
    cmd.arg("-pass").arg(pass.to_string());
    cmd.arg("-passlogfile").arg(log_prefix);
    cmd
}

async fn run_pass(mut cmd: Command, pass: u32) -> Result<(), EncoderError> {
    debug!(pass, cmd = ?cmd, "Running ffmpeg");

    let output = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| EncoderError::SpawnFailed(e.to_string()))?;

    if !output.status.success() {
        return Err(EncoderError::PassFailed {
            pass,
            code: output.status.code().unwrap_or(-1),
            stderr: last_stderr_line(&output.stderr),
        });
    }

    Ok(())
}

/// FFmpeg logs its actual error last; keep the report readable.
fn last_stderr_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink_matches_platform() {
        if cfg!(windows) {
            assert_eq!(null_sink(), "NUL");
        } else {
            assert_eq!(null_sink(), "/dev/null");
        }
    }

    #[test]
    fn last_stderr_line_skips_trailing_blanks() {
        let stderr = b"frame=  100\nConversion failed!\n\n";
        assert_eq!(last_stderr_line(stderr), "Conversion failed!");
    }

    #[test]
    fn last_stderr_line_handles_empty_output() {
        assert_eq!(last_stderr_line(b""), "");
    }
}
