use crate::cli::OutputFormat;
use crate::driver::{RunSummary, StopReason};
use crate::error::{IndexerError, UserFriendlyError};
use crate::ui::progress::format_hms;
use crate::uploader::Submission;
use console::{style, Emoji, Term};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

const RULE_WIDTH: usize = 60;

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &IndexerError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            self.print_suggestion(&suggestion);
        }
    }

    fn print_suggestion(&self, suggestion: &str) {
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    eprintln!(
                        "{}{}",
                        INFO,
                        style(format!("Suggestion: {}", suggestion)).cyan()
                    );
                } else {
                    eprintln!("Suggestion: {}", suggestion);
                }
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "suggestion",
                    "message": suggestion
                }));
            }
            OutputMode::Plain => eprintln!("SUGGESTION: {}", suggestion),
        }
    }

    /// Explains an early stop. Printed after the progress bar is finalized.
    pub fn print_stop_notice(&self, stop_reason: StopReason) {
        match stop_reason {
            StopReason::AuthExpired => {
                self.error("Authentication token expired. Please update the token and restart.");
                self.print_suggestion(&format!(
                    "Refresh the token in the dashboard and export it as {}.",
                    crate::config::TOKEN_ENV_VAR
                ));
            }
            StopReason::Interrupted => self.warning("Process interrupted by user."),
            StopReason::NothingToDo => self.warning("No URLs found. Exiting."),
            StopReason::Completed | StopReason::LimitReached => {}
        }
    }

    /// Printed even in quiet mode.
    pub fn print_run_summary(&self, summary: &RunSummary) {
        match self.mode {
            OutputMode::Human => self.print_human_summary(summary),
            OutputMode::Json => self.print_json_summary(summary),
            OutputMode::Plain => self.print_plain_summary(summary),
        }
    }

    /// Request and response dump for `--test`.
    pub fn print_debug_exchange(
        &self,
        endpoint: &str,
        url: &str,
        payload: &serde_json::Value,
        submission: &Submission,
    ) {
        if self.mode == OutputMode::Json {
            self.print_json_object(&serde_json::json!({
                "type": "debug_exchange",
                "endpoint": endpoint,
                "url": url,
                "payload": payload,
                "status": submission.status,
                "body": submission.body,
                "success": submission.outcome.is_success(),
                "message": submission.outcome.message(),
                "duration_ms": submission.duration.as_millis() as u64,
            }));
            return;
        }

        println!("{}", "=".repeat(RULE_WIDTH));
        println!("DEBUG: Testing single URL indexing");
        println!("{}", "=".repeat(RULE_WIDTH));
        println!("URL: {}", url);
        println!("API: {}", endpoint);
        println!();
        println!("Payload:");
        println!(
            "{}",
            serde_json::to_string_pretty(payload).unwrap_or_else(|_| "{}".to_string())
        );
        println!();
        match submission.status {
            Some(status) => println!("Response status: {}", status),
            None => println!("Response status: <no response>"),
        }
        if let Some(ref body) = submission.body {
            println!("Response body: {}", body);
        }
        println!();
        println!("{}", "=".repeat(RULE_WIDTH));
        println!(
            "Result: {}",
            if submission.outcome.is_success() {
                "SUCCESS"
            } else {
                "FAILED"
            }
        );
        println!("Message: {}", submission.outcome.message());
        println!("{}", "=".repeat(RULE_WIDTH));
    }

    fn print_separator(&self) {
        match self.mode {
            OutputMode::Human if self.use_colors => {
                println!("{}", style("─".repeat(RULE_WIDTH)).dim());
            }
            OutputMode::Human | OutputMode::Plain => println!("{}", "=".repeat(RULE_WIDTH)),
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        if self.use_colors {
            let (emoji, styled) = match msg_type {
                MessageType::Success => (CHECKMARK, style(message).green().bold()),
                MessageType::Error => (CROSS, style(message).red().bold()),
                MessageType::Warning => (WARNING, style(message).yellow().bold()),
                MessageType::Info => (INFO, style(message).cyan()),
            };

            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, summary: &RunSummary) {
        println!();
        self.print_separator();
        if self.use_colors {
            println!("{}", style("INDEXING COMPLETE").green().bold());
        } else {
            println!("INDEXING COMPLETE");
        }
        self.print_separator();

        let value = |v: String| {
            if self.use_colors {
                style(v).cyan().bold().to_string()
            } else {
                v
            }
        };

        println!("Total URLs processed: {}", value(summary.processed.to_string()));
        println!("Successful: {}", value(summary.succeeded.to_string()));
        println!("Failed: {}", value(summary.failed.to_string()));

        if self.verbose_level > 0 {
            println!("Rate-limit pauses: {}", summary.pauses);
            println!("Lines skipped: {}", summary.lines_skipped);
            println!("Time taken: {}", format_hms(summary.elapsed));
        }

        self.print_separator();
    }

    fn print_json_summary(&self, summary: &RunSummary) {
        let mut value = serde_json::to_value(summary).unwrap_or_else(|_| serde_json::json!({}));
        if let Some(obj) = value.as_object_mut() {
            obj.insert("type".to_string(), serde_json::json!("summary"));
            obj.insert(
                "timestamp".to_string(),
                serde_json::json!(chrono::Utc::now().to_rfc3339()),
            );
        }

        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, summary: &RunSummary) {
        let mut out = std::io::stdout().lock();
        let _ = write_plain_summary(&mut out, summary);
    }
}

/// The fixed summary block, as printed in plain mode.
pub fn write_plain_summary<W: Write>(out: &mut W, summary: &RunSummary) -> std::io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "INDEXING COMPLETE")?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "Total URLs processed: {}", summary.succeeded + summary.failed)?;
    writeln!(out, "Successful: {}", summary.succeeded)?;
    writeln!(out, "Failed: {}", summary.failed)?;
    writeln!(out, "{}", rule)?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}
