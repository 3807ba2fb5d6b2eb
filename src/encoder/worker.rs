//! Background worker that runs one compression job off the caller's task.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{ffmpeg, plan};
use crate::error::JobError;
use crate::job::{pass_log_prefix, EncodeRequest, JobEvent, JobResult, JobState};
use crate::media::probe;

/// Runs a single job: probe, plan, two encoder passes, log cleanup.
///
/// One job at a time per worker; the two-pass log path is derived from the
/// job's unique output path, so sequential jobs never share log files.
pub struct EncodeWorker {
    /// Channel for progress and terminal events.
    events: mpsc::Sender<JobEvent>,
}

/// Submits a request to a fresh worker on a background task.
///
/// The returned stream carries zero or more `Progress` events followed by
/// exactly one `Finished` event, in the order they occurred. The caller
/// must not resubmit until the terminal event arrives.
pub fn submit(request: EncodeRequest, output_path: PathBuf) -> mpsc::Receiver<JobEvent> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let worker = EncodeWorker::new(tx.clone());
        let result = worker.run(request, output_path).await;
        let _ = tx.send(JobEvent::Finished(result)).await;
    });
    rx
}

impl EncodeWorker {
    /// Creates a worker that reports over the given channel.
    pub fn new(events: mpsc::Sender<JobEvent>) -> Self {
        Self { events }
    }

    /// Runs one job to completion.
    ///
    /// Every probe, planning, or encoder error is converted into a
    /// `Failure` here; nothing propagates past the job boundary. Pass logs
    /// are removed whether the passes succeeded or not, and a cleanup
    /// failure never turns a successful encode into a failed job.
    pub async fn run(&self, request: EncodeRequest, output_path: PathBuf) -> JobResult {
        info!(
            input = %request.input_path.display(),
            output = %output_path.display(),
            "Starting compression job"
        );

        let log_prefix = pass_log_prefix(&output_path);
        let outcome = self.run_passes(&request, &output_path, &log_prefix).await;

        debug!(state = ?JobState::CleaningUp, prefix = %log_prefix.display(), "Removing pass logs");
        cleanup_pass_logs(&log_prefix);

        match outcome {
            Ok(()) => {
                self.send(JobState::Succeeded, "Compression complete!").await;
                info!(output = %output_path.display(), "Compression complete");
                JobResult::Success { output_path }
            }
            Err(e) => {
                warn!(error = %e, "Compression failed");
                JobResult::Failure {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Probes, plans, and sequences the two encoder passes in order.
    async fn run_passes(
        &self,
        request: &EncodeRequest,
        output_path: &Path,
        log_prefix: &Path,
    ) -> Result<(), JobError> {
        debug!(state = ?JobState::Planning, "Probing source");
        let info = probe(&request.input_path).await?;
        let plan = plan::plan(request, &info)?;
        info!(
            video_kbps = plan.video_bitrate_kbps,
            width = plan.output_width,
            height = plan.output_height,
            fps = plan.output_fps,
            "Planned encode"
        );

        self.send(JobState::Pass1Running, "Pass 1: Analyzing...").await;
        ffmpeg::run_pass_one(&request.input_path, &plan, log_prefix).await?;

        self.send(JobState::Pass2Running, "Pass 2: Compressing...").await;
        ffmpeg::run_pass_two(&request.input_path, output_path, &plan, log_prefix).await?;

        Ok(())
    }

    async fn send(&self, state: JobState, message: &str) {
        let _ = self
            .events
            .send(JobEvent::Progress {
                state,
                message: message.to_string(),
            })
            .await;
    }
}

/// Best-effort removal of every file carrying the job's pass-log prefix.
///
/// ffmpeg writes `<prefix>-0.log` and `<prefix>-0.log.mbtree`; deletion
/// errors are logged and swallowed.
fn cleanup_pass_logs(log_prefix: &Path) {
    let pattern = format!("{}*", log_prefix.display());
    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(error = %e, pattern, "Bad pass-log pattern");
            return;
        }
    };

    for entry in entries.flatten() {
        if let Err(e) = std::fs::remove_file(&entry) {
            debug!(error = %e, file = %entry.display(), "Failed to remove pass log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_removes_only_prefixed_files() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("clip_compressed_2pass.log");

        let log0 = dir.path().join("clip_compressed_2pass.log-0.log");
        let mbtree = dir.path().join("clip_compressed_2pass.log-0.log.mbtree");
        let unrelated = dir.path().join("clip_compressed.mp4");
        std::fs::write(&log0, b"stats").unwrap();
        std::fs::write(&mbtree, b"tree").unwrap();
        std::fs::write(&unrelated, b"video").unwrap();

        cleanup_pass_logs(&prefix);

        assert!(!log0.exists());
        assert!(!mbtree.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn cleanup_is_a_no_op_without_logs() {
        let dir = tempfile::tempdir().unwrap();
        cleanup_pass_logs(&dir.path().join("missing_2pass.log"));
    }

    #[tokio::test]
    async fn failed_probe_yields_single_failure_and_no_pass_events() {
        let dir = tempfile::tempdir().unwrap();
        let request = EncodeRequest {
            input_path: dir.path().join("does_not_exist.mp4"),
            target_size_mb: 10.0,
            scale_percent: 100,
            target_fps: 30,
        };
        let output = dir.path().join("does_not_exist_compressed.mp4");

        let mut rx = submit(request, output.clone());

        let mut progress = Vec::new();
        let mut terminal = None;
        while let Some(event) = rx.recv().await {
            match event {
                JobEvent::Progress { state, .. } => progress.push(state),
                JobEvent::Finished(result) => {
                    terminal = Some(result);
                    break;
                }
            }
        }

        assert!(!progress.contains(&JobState::Pass1Running));
        assert!(matches!(terminal, Some(JobResult::Failure { .. })));
        assert!(!output.exists());
        assert!(rx.recv().await.is_none());
    }
}
