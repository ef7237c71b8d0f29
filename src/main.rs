use anyhow::Context;
use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;
use url_indexer::{
    Cli, IndexerError, OutputFormatter, OutputMode, Submission, UrlIndexer,
    UserFriendlyError,
};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbosity_level()) {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let indexer = match UrlIndexer::from_cli(&cli) {
        Ok(indexer) => indexer,
        Err(e) => {
            print_startup_error(&e, &cli);
            return 1;
        }
    };

    if cli.test {
        return handle_test_mode(&cli, &indexer);
    }

    let input = match cli.resolve_input(indexer.config()) {
        Ok(input) => input,
        Err(e) => {
            indexer.handle_error(&e);
            return 2;
        }
    };

    match indexer.index_file(&input, cli.limit) {
        Ok(summary) => summary.stop_reason.exit_code(),
        Err(e) => {
            indexer.handle_error(&e);
            error_exit_code(&e)
        }
    }
}

fn error_exit_code(error: &IndexerError) -> i32 {
    match error {
        IndexerError::InputFile { .. } => 2,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "url-indexer.toml".to_string());

    match UrlIndexer::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  url-indexer <links.csv> --config {}", config_path);
            println!("\nSet auth_token in the file or export URL_INDEXER_TOKEN before running.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_test_mode(cli: &Cli, indexer: &UrlIndexer) -> i32 {
    let formatter = indexer.output_formatter();
    formatter.start_operation("TEST MODE - sending a single URL");

    match indexer.send_test_url(cli.test_url()) {
        Ok(submission) => {
            if submission.outcome.is_success() {
                formatter.success("Test URL accepted by the indexing API");
            }
            test_mode_exit_code(&submission)
        }
        Err(e) => {
            indexer.handle_error(&e);
            error_exit_code(&e)
        }
    }
}

fn test_mode_exit_code(submission: &Submission) -> i32 {
    if submission.outcome.is_success() {
        0
    } else if submission.outcome.is_auth_expired() {
        4
    } else {
        1
    }
}

fn print_startup_error(error: &IndexerError, cli: &Cli) {
    let mode = OutputMode::from(cli.output_format.clone());
    let formatter = OutputFormatter::new(mode, 0, false);
    formatter.print_user_friendly_error(error);
}

/// Diagnostics go to stderr; RUST_LOG overrides the verbosity flags.
fn setup_logging(verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("url_indexer={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("installing tracing subscriber")
}
