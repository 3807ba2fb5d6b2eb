//! Two-pass encoding: planning, ffmpeg invocation, and the job worker.

pub mod ffmpeg;
pub mod plan;
pub mod worker;

pub use plan::{plan, EncodePlan};
pub use worker::{submit, EncodeWorker};
