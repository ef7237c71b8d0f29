use crate::config::RateLimitConfig;
use crate::driver::run_progress::{RunProgress, RunSummary, StopReason};
use crate::error::Result;
use crate::reader::UrlSource;
use crate::ui::progress::{finish_upload_progress, update_upload_progress};
use crate::ui::GracefulShutdown;
use crate::uploader::outcome::truncate_chars;
use crate::uploader::Submit;
use indicatif::ProgressBar;
use std::time::Duration;

/// Blocks the runner during a rate-limit pause.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// What a run will do, decided by the counting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    pub urls_found: usize,
    pub total: usize,
}

impl RunPlan {
    pub fn is_limited(&self) -> bool {
        self.total < self.urls_found
    }
}

/// Submits URLs one at a time, pausing after every full batch.
pub struct BatchRunner<'a, S: Submit> {
    submitter: &'a S,
    shutdown: &'a GracefulShutdown,
    sleeper: &'a dyn Sleeper,
    batch_size: usize,
    pause_seconds: u64,
    limit: Option<usize>,
}

impl<'a, S: Submit> BatchRunner<'a, S> {
    pub fn new(submitter: &'a S, shutdown: &'a GracefulShutdown) -> Self {
        let defaults = RateLimitConfig::default();
        Self {
            submitter,
            shutdown,
            sleeper: &ThreadSleeper,
            batch_size: defaults.batch_size,
            pause_seconds: defaults.pause_seconds,
            limit: None,
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: &RateLimitConfig) -> Self {
        self.batch_size = rate_limit.batch_size.max(1);
        self.pause_seconds = rate_limit.pause_seconds;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_sleeper(mut self, sleeper: &'a dyn Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Counting pass over the whole file, capped by the limit.
    pub fn plan(&self, source: &UrlSource) -> Result<RunPlan> {
        let urls_found = source.count()?;
        let total = match self.limit {
            Some(limit) => urls_found.min(limit),
            None => urls_found,
        };
        Ok(RunPlan { urls_found, total })
    }

    /// Plans and executes without a visible progress bar.
    pub fn run(&self, source: &UrlSource) -> Result<RunSummary> {
        let plan = self.plan(source)?;
        self.execute(source, plan, &ProgressBar::hidden())
    }

    /// Second pass: re-reads the file from the top and submits up to `plan.total` URLs,
    /// reporting each one on `pb`.
    pub fn execute(&self, source: &UrlSource, plan: RunPlan, pb: &ProgressBar) -> Result<RunSummary> {
        if plan.total == 0 {
            return Ok(RunSummary::empty(plan.urls_found));
        }

        let mut reader = source.open()?;
        let mut state = RunProgress::new(plan.total);
        let mut batch_count = 0usize;
        let mut pauses = 0usize;
        let mut stop_reason = StopReason::Completed;

        for (index, url) in reader.by_ref().enumerate() {
            let position = index + 1;

            if !self.shutdown.is_running() {
                stop_reason = StopReason::Interrupted;
                break;
            }

            let outcome = self.submitter.submit(&url);
            state.record(&outcome);

            let status = if outcome.is_success() {
                format!("OK - {}...", truncate_chars(&url, 40))
            } else {
                format!(
                    "FAIL ({}) - {}...",
                    outcome.message(),
                    truncate_chars(&url, 30)
                )
            };
            update_upload_progress(pb, &state, status);

            if outcome.is_auth_expired() {
                tracing::warn!(position, "auth token rejected; stopping run");
                stop_reason = StopReason::AuthExpired;
                break;
            }

            batch_count += 1;

            if batch_count >= self.batch_size && position < plan.total {
                batch_count = 0;
                pauses += 1;
                if !self.pause(pb, position) {
                    stop_reason = StopReason::Interrupted;
                    break;
                }
            }

            if state.is_complete() {
                if plan.is_limited() {
                    stop_reason = StopReason::LimitReached;
                }
                break;
            }
        }

        let lines_skipped = reader.stats().lines_skipped;
        if lines_skipped > 0 {
            tracing::debug!(lines_skipped, "lines without a recognizable URL were skipped");
        }

        finish_upload_progress(pb, stop_reason);

        Ok(RunSummary {
            urls_found: plan.urls_found,
            planned: plan.total,
            processed: state.processed,
            succeeded: state.succeeded,
            failed: state.failed,
            pauses,
            lines_skipped,
            elapsed: state.elapsed(),
            stop_reason,
        })
    }

    /// Counts down the rate-limit pause one second at a time. Returns false if
    /// an interrupt arrived meanwhile.
    fn pause(&self, pb: &ProgressBar, position: usize) -> bool {
        tracing::info!(
            after = position,
            seconds = self.pause_seconds,
            "batch complete, pausing for rate limit"
        );

        for remaining in (1..=self.pause_seconds).rev() {
            if !self.shutdown.is_running() {
                return false;
            }
            pb.set_message(format!("Rate limit - waiting {}s", remaining));
            self.sleeper.sleep(Duration::from_secs(1));
        }

        self.shutdown.is_running()
    }
}
