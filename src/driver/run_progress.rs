use crate::uploader::SubmitOutcome;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Counters for an upload run. Owned by the runner; the progress bar only reads them.
#[derive(Debug, Clone)]
pub struct RunProgress {
    pub processed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub start_time: Instant,
}

impl RunProgress {
    pub fn new(total: usize) -> Self {
        Self {
            processed: 0,
            total,
            succeeded: 0,
            failed: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record(&mut self, outcome: &SubmitOutcome) {
        self.processed += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Linear estimate: average time per item so far times items left.
pub fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Duration {
    if done == 0 || done >= total {
        return Duration::ZERO;
    }
    elapsed.mul_f64((total - done) as f64 / done as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every counted URL was submitted.
    Completed,
    /// The input held no URLs.
    NothingToDo,
    LimitReached,
    /// The service answered 401; the token must be refreshed.
    AuthExpired,
    Interrupted,
}

impl StopReason {
    pub fn exit_code(self) -> i32 {
        match self {
            StopReason::Completed | StopReason::NothingToDo | StopReason::LimitReached => 0,
            StopReason::AuthExpired => 4,
            StopReason::Interrupted => 130,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// URLs found in the file, before any limit.
    pub urls_found: usize,
    /// URLs the run intended to process.
    pub planned: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pauses: usize,
    pub lines_skipped: usize,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub stop_reason: StopReason,
}

impl RunSummary {
    pub fn empty(urls_found: usize) -> Self {
        Self {
            urls_found,
            planned: 0,
            processed: 0,
            succeeded: 0,
            failed: 0,
            pauses: 0,
            lines_skipped: 0,
            elapsed: Duration::ZERO,
            stop_reason: StopReason::NothingToDo,
        }
    }
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
