pub mod batch_runner;
pub mod run_progress;

pub use batch_runner::{BatchRunner, RunPlan, Sleeper, ThreadSleeper};
pub use run_progress::{estimate_remaining, RunProgress, RunSummary, StopReason};
