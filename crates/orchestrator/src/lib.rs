//! Orchestrator - connect scan engine and worker coordination

mod orchestrator;
mod progress;

pub use orchestrator::Orchestrator;
pub use progress::{ProgressSnapshot, ProgressTracker};
pub use tokio_util::sync::CancellationToken;
