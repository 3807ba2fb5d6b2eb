//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Two-pass ffmpeg compressor that targets an exact output file size.
#[derive(Parser, Debug)]
#[command(name = "shrinkray", version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the log level based on verbosity flags.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress a video to a target size with two-pass encoding.
    Compress(CompressArgs),

    /// Show duration, dimensions, and frame rate of a video file.
    Probe(ProbeArgs),
}

/// Arguments for the compress subcommand.
#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Source video file.
    pub input: PathBuf,

    /// Target output size in megabytes.
    #[arg(short = 's', long = "size", env = "SHRINKRAY_SIZE_MB", default_value_t = 10.0)]
    pub target_size_mb: f64,

    /// Resolution scale percentage (25-100).
    #[arg(long, env = "SHRINKRAY_SCALE", default_value_t = 100)]
    pub scale: u32,

    /// Frame rate ceiling; never raised above the source rate.
    #[arg(long, env = "SHRINKRAY_FPS", default_value_t = 24)]
    pub fps: u32,
}

/// Arguments for the probe subcommand.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Video file to inspect.
    pub input: PathBuf,

    /// Print the result as JSON.
    #[arg(long, default_value = "false")]
    pub json: bool,
}
