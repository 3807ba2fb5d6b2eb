//! shrinkray - compress a video to a target file size with two-pass ffmpeg.
//!
//! The crate is a thin orchestration layer around two external tools:
//! ffprobe supplies duration/dimensions/frame rate, and ffmpeg runs an
//! analysis pass followed by a compressing pass against a computed bitrate.
//! All blocking work happens on a background task that streams progress
//! events back to the CLI frontend.

pub mod cli;
pub mod encoder;
pub mod error;
pub mod job;
pub mod media;
pub mod validation;

use anyhow::Result;
use tracing::info;

use crate::cli::{Cli, Commands, CompressArgs, ProbeArgs};
use crate::job::{EncodeRequest, JobEvent, JobResult};

/// Runs the tool with the provided CLI arguments.
pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.log_level())?;

    match cli.command {
        Commands::Compress(args) => run_compress(args).await,
        Commands::Probe(args) => run_probe(args).await,
    }
}

/// Initializes the tracing subscriber for structured logging.
fn setup_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_target(true).init();

    Ok(())
}

/// Validates the request, submits one job, and relays its events.
async fn run_compress(args: CompressArgs) -> Result<()> {
    let request = EncodeRequest {
        input_path: args.input,
        target_size_mb: args.target_size_mb,
        scale_percent: args.scale,
        target_fps: args.fps,
    };
    validation::validate_request(&request)?;

    let output_path = job::allocate_output_path(&request.input_path);
    info!(output = %output_path.display(), "Allocated output path");
    println!(
        "Compressing {} to {} MB",
        request.input_path.display(),
        request.target_size_mb
    );

    let mut events = encoder::submit(request, output_path);
    while let Some(event) = events.recv().await {
        match event {
            JobEvent::Progress { message, .. } => println!("{message}"),
            JobEvent::Finished(JobResult::Success { output_path }) => {
                println!("Saved to: {}", output_path.display());
                return Ok(());
            }
            JobEvent::Finished(JobResult::Failure { reason }) => {
                anyhow::bail!("Compression failed: {reason}");
            }
        }
    }

    anyhow::bail!("Worker exited without reporting a result")
}

/// Probes a file and prints its metadata.
async fn run_probe(args: ProbeArgs) -> Result<()> {
    let info = media::probe(&args.input).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Duration: {:.2} s", info.duration_secs);
        println!("Resolution: {}x{}", info.width, info.height);
        println!("Frame rate: {:.3} fps", info.fps);
    }

    Ok(())
}
