//! Job types shared between the CLI frontend and the encode worker.

use std::path::{Path, PathBuf};

/// A single compression request, immutable once submitted.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    /// Source video file.
    pub input_path: PathBuf,
    /// Desired output size in megabytes.
    pub target_size_mb: f64,
    /// Resolution scale percentage, 25 to 100.
    pub scale_percent: u32,
    /// Frame rate ceiling; the source rate is never exceeded.
    pub target_fps: u32,
}

/// Phases a job moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Planning,
    Pass1Running,
    Pass2Running,
    CleaningUp,
    Succeeded,
    Failed,
}

/// Terminal outcome of a job.
#[derive(Debug, Clone)]
pub enum JobResult {
    Success { output_path: PathBuf },
    Failure { reason: String },
}

/// Event delivered from the background worker to the submitting context.
///
/// A job emits zero or more `Progress` events followed by exactly one
/// `Finished` event.
#[derive(Debug, Clone)]
pub enum JobEvent {
    Progress { state: JobState, message: String },
    Finished(JobResult),
}

/// Picks a free output path beside the input.
///
/// `video.mp4` becomes `video_compressed.mp4`; if that already exists the
/// counter variants `video_compressed_1.mp4`, `video_compressed_2.mp4`, ...
/// are tried in order, so an existing file is never overwritten. The output
/// is always an `.mp4` since pass 2 encodes H.264/AAC.
pub fn allocate_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let dir = input.parent().unwrap_or_else(|| Path::new(""));

    let mut candidate = dir.join(format!("{stem}_compressed.mp4"));
    let mut counter = 1u32;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}_compressed_{counter}.mp4"));
        counter += 1;
    }
    candidate
}

/// Derives the two-pass log file path for an output path.
///
/// The log lives beside the output so the job always has write access.
/// ffmpeg appends its own suffixes (`-0.log`, `.mbtree`), so cleanup
/// matches on this prefix rather than the exact name.
pub fn pass_log_prefix(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let dir = output.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{stem}_2pass.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_appends_compressed_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("video.mp4");
        std::fs::write(&input, b"x").unwrap();

        let output = allocate_output_path(&input);
        assert_eq!(output, dir.path().join("video_compressed.mp4"));
    }

    #[test]
    fn output_path_counts_up_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("video.mp4");
        std::fs::write(&input, b"x").unwrap();

        std::fs::write(dir.path().join("video_compressed.mp4"), b"x").unwrap();
        let output = allocate_output_path(&input);
        assert_eq!(output, dir.path().join("video_compressed_1.mp4"));

        std::fs::write(&output, b"x").unwrap();
        let output = allocate_output_path(&input);
        assert_eq!(output, dir.path().join("video_compressed_2.mp4"));
    }

    #[test]
    fn output_is_mp4_regardless_of_source_container() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mkv");
        std::fs::write(&input, b"x").unwrap();

        let output = allocate_output_path(&input);
        assert_eq!(output, dir.path().join("clip_compressed.mp4"));
    }

    #[test]
    fn log_prefix_sits_beside_the_output() {
        let output = Path::new("/videos/clip_compressed.mp4");
        assert_eq!(
            pass_log_prefix(output),
            PathBuf::from("/videos/clip_compressed_2pass.log")
        );
    }
}
