use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::net::TcpListener;
use tempfile::TempDir;

fn url_indexer(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("url-indexer").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("URL_INDEXER_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/index", addr)
}

#[test]
fn help_lists_the_main_flags() {
    let workdir = TempDir::new().unwrap();
    url_indexer(&workdir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--limit"))
        .stdout(predicate::str::contains("--test"))
        .stdout(predicate::str::contains("--batch-size"));
}

#[test]
fn generate_config_writes_sample_file() {
    let workdir = TempDir::new().unwrap();
    let config_path = workdir.path().join("custom.toml");

    url_indexer(&workdir)
        .args(["--generate-config", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated sample configuration file"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[api]"));
    assert!(content.contains("batch_size = 100"));
}

#[test]
fn missing_token_is_a_startup_error() {
    let workdir = TempDir::new().unwrap();
    let export = workdir.path().join("links.csv");
    fs::write(&export, "Title,URL,Date\n").unwrap();

    url_indexer(&workdir)
        .arg(&export)
        .args(["--output-format", "plain"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("URL_INDEXER_TOKEN"));
}

#[test]
fn export_without_urls_exits_cleanly() {
    let workdir = TempDir::new().unwrap();
    let export = workdir.path().join("links.csv");
    fs::write(&export, "Title,URL,Date\n\"Intro,no link here\"\n").unwrap();

    url_indexer(&workdir)
        .arg(&export)
        .args(["--output-format", "plain", "--endpoint"])
        .arg(closed_endpoint())
        .env("URL_INDEXER_TOKEN", "test-token")
        .assert()
        .success()
        .stdout(predicate::str::contains("No URLs found"));
}

#[test]
fn quiet_run_still_prints_summary() {
    let workdir = TempDir::new().unwrap();
    let export = workdir.path().join("links.csv");
    fs::write(
        &export,
        "Title,URL,Date\n\
         \"A,\"\"https://a.example/1\"\",\"\"2025-12-09\"\"\"\n\
         \"B,\"\"https://a.example/2\"\",\"\"2025-12-09\"\"\"\n",
    )
    .unwrap();

    url_indexer(&workdir)
        .arg(&export)
        .args(["-q", "--output-format", "plain", "--token", "test-token", "--endpoint"])
        .arg(closed_endpoint())
        .assert()
        .success()
        .stdout(predicate::str::contains("INDEXING COMPLETE"))
        .stdout(predicate::str::contains("Total URLs processed: 2"))
        .stdout(predicate::str::contains("Failed: 2"));
}

#[test]
fn zero_limit_is_rejected() {
    let workdir = TempDir::new().unwrap();

    url_indexer(&workdir)
        .args(["links.csv", "--limit", "0", "--token", "test-token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn missing_input_file_exits_with_code_two() {
    let workdir = TempDir::new().unwrap();

    url_indexer(&workdir)
        .arg("does-not-exist.csv")
        .args(["--output-format", "plain", "--token", "test-token"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does-not-exist.csv"));
}

#[test]
fn limit_and_test_mode_conflict() {
    let workdir = TempDir::new().unwrap();

    url_indexer(&workdir)
        .args(["--test", "--limit", "3", "--token", "test-token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
