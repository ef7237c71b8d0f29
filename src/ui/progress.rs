use crate::driver::{estimate_remaining, RunProgress, StopReason};
use indicatif::{MultiProgress, ProgressBar, ProgressState, ProgressStyle};
use std::fmt::Write;
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "[{bar:50}] {pos}/{len} ({pct}%) | Elapsed: {elapsed_precise} | ETA: {eta_hms} | {msg}";

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    pub fn create_upload_progress(&self, total: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(total));
        pb.set_style(upload_style());
        pb.set_message("Starting...");
        pb.enable_steady_tick(Duration::from_secs(1));
        pb
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }
}

fn upload_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("pct", |state: &ProgressState, w: &mut dyn Write| {
            let _ = write!(w, "{:.1}", state.fraction() * 100.0);
        })
        .with_key("eta_hms", |state: &ProgressState, w: &mut dyn Write| {
            let total = state.len().unwrap_or(0) as usize;
            let remaining = estimate_remaining(state.elapsed(), state.pos() as usize, total);
            let _ = write!(w, "{}", format_hms(remaining));
        })
        .progress_chars("=-")
}

pub fn update_upload_progress(pb: &ProgressBar, progress: &RunProgress, status: String) {
    pb.set_position(progress.processed as u64);
    pb.set_message(status);
}

pub fn finish_upload_progress(pb: &ProgressBar, stop_reason: StopReason) {
    match stop_reason {
        StopReason::AuthExpired | StopReason::Interrupted => pb.abandon(),
        _ => pb.finish(),
    }
}

/// `HH:MM:SS`, hours not capped at 24.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
