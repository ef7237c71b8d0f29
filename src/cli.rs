use crate::config::{CliOverrides, Config, TOKEN_ENV_VAR};
use crate::error::{IndexerError, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use url::Url;

/// URL submitted by `--test` unless `--test-url` says otherwise.
pub const DEFAULT_TEST_URL: &str =
    "https://learn.microsoft.com/en-us/dynamics365/finance/finance-welcome";

/// URLs processed by a bare `--limit`.
pub const DEFAULT_DRY_RUN_LIMIT: &str = "10";

#[derive(Parser, Debug)]
#[command(name = "url-indexer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Submit URLs from a CSV export to a learning-center indexing API")]
#[command(
    long_about = "url-indexer reads page URLs from a CSV export and submits them one at a \
                  time to the indexing endpoint, pausing between batches to respect the \
                  service's rate limit."
)]
#[command(after_help = "EXAMPLES:\n  \
    URL_INDEXER_TOKEN=eyJ... url-indexer links.csv\n  \
    url-indexer links.csv --limit 5\n  \
    url-indexer --test\n  \
    url-indexer links.csv --batch-size 50 --pause-secs 120 --url-column URL\n  \
    url-indexer --generate-config --config url-indexer.toml")]
pub struct Cli {
    /// CSV export holding the URLs (overrides [input] path in the config)
    pub input: Option<PathBuf>,

    /// Process at most N URLs (defaults to 10 when given without a value)
    #[arg(
        long,
        value_name = "N",
        num_args = 0..=1,
        default_missing_value = DEFAULT_DRY_RUN_LIMIT,
        value_parser = parse_limit
    )]
    pub limit: Option<usize>,

    /// Send a single test URL and print the request and response
    #[arg(long, conflicts_with = "limit")]
    pub test: bool,

    /// URL to send in --test mode
    #[arg(long, requires = "test", value_parser = validate_http_url)]
    pub test_url: Option<String>,

    /// Bearer token for the indexing API
    #[arg(long, env = TOKEN_ENV_VAR, hide_env_values = true)]
    pub token: Option<String>,

    /// Indexing endpoint URL
    #[arg(long, value_parser = validate_http_url)]
    pub endpoint: Option<String>,

    /// URLs per batch before a rate-limit pause
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Seconds to pause after each full batch
    #[arg(long)]
    pub pause_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Header name of the column holding the URL
    #[arg(long)]
    pub url_column: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bar and non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Write a sample configuration file and exit")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_endpoint(self.endpoint.clone())
            .with_auth_token(self.token.clone())
            .with_timeout(self.timeout)
            .with_batch_size(self.batch_size)
            .with_pause_seconds(self.pause_secs)
            .with_input(self.input.clone())
            .with_url_column(self.url_column.clone())
    }

    /// Input file from the CLI or, failing that, the config.
    pub fn resolve_input(&self, config: &Config) -> Result<PathBuf> {
        self.input
            .clone()
            .or_else(|| config.input.path.clone())
            .ok_or_else(|| IndexerError::Config {
                message: "No input file given. Pass a CSV path or set [input] path".to_string(),
            })
    }

    pub fn test_url(&self) -> &str {
        self.test_url.as_deref().unwrap_or(DEFAULT_TEST_URL)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Parses `--limit`, which must be at least 1.
pub fn parse_limit(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("limit must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a positive number", s)),
    }
}

pub fn validate_http_url(s: &str) -> std::result::Result<String, String> {
    let url = Url::parse(s).map_err(|_| "Invalid URL format. Please provide a valid URL.".to_string())?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err("Only http and https URLs are supported".to_string()),
    }

    if url.host_str().is_none() {
        return Err("URL must include a valid hostname".to_string());
    }

    Ok(s.to_string())
}
