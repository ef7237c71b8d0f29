pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod reader;
pub mod ui;
pub mod uploader;

#[cfg(test)]
pub(crate) mod test_support;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{ApiConfig, CliOverrides, Config, InputConfig, RateLimitConfig};
pub use error::{IndexerError, Result, UserFriendlyError};

// Core functionality re-exports
pub use driver::{BatchRunner, RunPlan, RunSummary, Sleeper, StopReason};
pub use reader::{count_urls, extract_marked_url, UrlReader, UrlSource};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};
pub use uploader::{FailureReason, Submission, Submit, SubmitOutcome, Uploader};

use std::path::Path;

/// Main library interface: one configured indexing session.
pub struct UrlIndexer {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl UrlIndexer {
    /// Create a new indexer and install the Ctrl+C handler.
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode != OutputMode::Json);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create an indexer for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = OutputMode::from(cli_args.output_format.clone());

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Submit every URL in `input` (or the first `limit` of them) and print the summary.
    pub fn index_file(&self, input: &Path, limit: Option<usize>) -> Result<RunSummary> {
        let uploader = Uploader::new(&self.config.api)?;
        let source = UrlSource::new(input).with_url_column(self.config.input.url_column.clone());
        let runner = BatchRunner::new(&uploader, &self.shutdown)
            .with_rate_limit(&self.config.rate_limit)
            .with_limit(limit);

        let spinner = self.progress_manager.create_spinner("Counting URLs...");
        let plan = runner.plan(&source);
        spinner.finish_and_clear();
        let plan = plan?;

        if plan.total == 0 {
            self.output_formatter.print_stop_notice(StopReason::NothingToDo);
            return Ok(RunSummary::empty(plan.urls_found));
        }

        if plan.is_limited() {
            self.output_formatter.start_operation(&format!(
                "Found {} URLs - limiting to {} for testing",
                plan.urls_found, plan.total
            ));
        } else {
            self.output_formatter
                .start_operation(&format!("Found {} URLs to index", plan.total));
        }
        self.output_formatter.info(&format!(
            "Batches of {} with a {}s pause against {}",
            self.config.rate_limit.batch_size,
            self.config.rate_limit.pause_seconds,
            uploader.endpoint()
        ));
        self.output_formatter.start_operation("Starting indexing process...");

        let pb = self.progress_manager.create_upload_progress(plan.total as u64);
        let summary = runner.execute(&source, plan, &pb)?;

        tracing::info!(
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            stop_reason = ?summary.stop_reason,
            "run finished"
        );

        self.output_formatter.print_stop_notice(summary.stop_reason);
        self.output_formatter.print_run_summary(&summary);

        Ok(summary)
    }

    /// Debug mode: send one URL and print the full exchange.
    pub fn send_test_url(&self, url: &str) -> Result<Submission> {
        let uploader = Uploader::new(&self.config.api)?;
        let payload = serde_json::to_value(uploader.payload(url))?;

        self.output_formatter.info(&format!(
            "Sending request with token {}",
            self.config.redacted_token()
        ));
        let submission = uploader.submit_detailed(url);
        self.output_formatter
            .print_debug_exchange(uploader.endpoint(), url, &payload, &submission);

        Ok(submission)
    }

    /// Generate sample configuration file holding every default.
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &IndexerError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_export, MockEndpoint};
    use tempfile::TempDir;

    fn config_for(endpoint: &str) -> Config {
        let mut config = Config::default();
        config.api.endpoint = endpoint.to_string();
        config.api.auth_token = "test-token".to_string();
        config.api.timeout_secs = 5;
        config
    }

    #[test]
    fn test_index_file_against_mock_endpoint() {
        let server = MockEndpoint::start(vec![200, 500, 201]);
        let indexer =
            UrlIndexer::new_for_test(config_for(server.url()), OutputMode::Plain, 0, true);
        let file = write_export(&[
            "https://a.example/1",
            "https://a.example/2",
            "https://a.example/3",
        ]);

        let summary = indexer.index_file(file.path(), None).unwrap();

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.stop_reason, StopReason::Completed);

        let bodies: Vec<String> = server
            .requests()
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_str(&r.body).unwrap();
                body["url"][0]["url"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(
            bodies,
            vec![
                "https://a.example/1",
                "https://a.example/2",
                "https://a.example/3"
            ]
        );
    }

    #[test]
    fn test_index_file_stops_on_auth_expiry() {
        let server = MockEndpoint::start(vec![200, 401]);
        let indexer =
            UrlIndexer::new_for_test(config_for(server.url()), OutputMode::Plain, 0, true);
        let file = write_export(&[
            "https://a.example/1",
            "https://a.example/2",
            "https://a.example/3",
            "https://a.example/4",
        ]);

        let summary = indexer.index_file(file.path(), None).unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.stop_reason, StopReason::AuthExpired);
        assert_eq!(server.requests().len(), 2);
    }

    #[test]
    fn test_index_file_with_limit() {
        let server = MockEndpoint::start(vec![200, 200]);
        let indexer =
            UrlIndexer::new_for_test(config_for(server.url()), OutputMode::Json, 0, true);
        let file = write_export(&[
            "https://a.example/1",
            "https://a.example/2",
            "https://a.example/3",
        ]);

        let summary = indexer.index_file(file.path(), Some(2)).unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.stop_reason, StopReason::LimitReached);
    }

    #[test]
    fn test_index_file_without_urls() {
        let indexer = UrlIndexer::new_for_test(
            config_for("http://127.0.0.1:9/index"),
            OutputMode::Plain,
            0,
            true,
        );
        let file = write_export(&[]);

        let summary = indexer.index_file(file.path(), None).unwrap();
        assert_eq!(summary.stop_reason, StopReason::NothingToDo);
        assert_eq!(summary.processed, 0);
    }

    #[test]
    fn test_missing_input_file() {
        let indexer = UrlIndexer::new_for_test(
            config_for("http://127.0.0.1:9/index"),
            OutputMode::Plain,
            0,
            true,
        );
        let result = indexer.index_file(Path::new("/no/such/export.csv"), None);
        assert!(matches!(result, Err(IndexerError::InputFile { .. })));
    }

    #[test]
    fn test_send_test_url() {
        let server = MockEndpoint::start(vec![201]);
        let indexer =
            UrlIndexer::new_for_test(config_for(server.url()), OutputMode::Json, 0, true);

        let submission = indexer.send_test_url(cli::DEFAULT_TEST_URL).unwrap();
        assert!(submission.outcome.is_success());
        assert_eq!(submission.status, Some(201));
        assert!(server.requests()[0].body.contains(cli::DEFAULT_TEST_URL));
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        UrlIndexer::generate_sample_config(&config_path).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[api]"));
        assert!(content.contains("[rate_limit]"));
        assert!(content.contains("batch_size = 100"));

        let reloaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(reloaded.api.timeout_secs, 30);
    }

    #[test]
    fn test_interrupt_before_run_still_summarizes() {
        let server = MockEndpoint::start(vec![200]);
        let indexer =
            UrlIndexer::new_for_test(config_for(server.url()), OutputMode::Plain, 0, true);
        assert!(indexer.is_running());

        indexer.request_shutdown();
        assert!(!indexer.is_running());

        let file = write_export(&["https://a.example/1", "https://a.example/2"]);
        let summary = indexer.index_file(file.path(), None).unwrap();

        assert_eq!(summary.stop_reason, StopReason::Interrupted);
        assert_eq!(summary.urls_found, 2);
        assert_eq!(summary.processed, 0);
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_version_info() {
        assert!(!version_info().is_empty());
    }
}
