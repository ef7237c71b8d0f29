use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read input file {path}: {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid endpoint URL: {url}")]
    InvalidUrl { url: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client setup failed: {message}")]
    HttpClient { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for IndexerError {
    fn user_message(&self) -> String {
        match self {
            IndexerError::InputFile { path, source } => {
                format!("Could not open {}: {}", path.display(), source)
            }
            IndexerError::InvalidUrl { url } => {
                format!("Invalid endpoint URL: {}", url)
            }
            IndexerError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            IndexerError::HttpClient { message } => {
                format!("Could not prepare the HTTP client: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            IndexerError::InputFile { .. } => Some(
                "Check the path to the CSV export. Pass it as the first argument or set [input] path in the config file.".to_string()
            ),
            IndexerError::InvalidUrl { .. } => Some(
                "The endpoint must be an absolute http(s) URL, e.g. https://api.example.com/learning-center/index".to_string()
            ),
            IndexerError::Config { .. } => Some(
                "Check your configuration file syntax, or generate a fresh one with --generate-config.".to_string()
            ),
            IndexerError::HttpClient { .. } => Some(
                "Header values (including the auth token) must be printable ASCII without line breaks.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for IndexerError {
    fn from(error: toml::de::Error) -> Self {
        IndexerError::Config {
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for IndexerError {
    fn from(error: reqwest::Error) -> Self {
        IndexerError::HttpClient {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexerError>;
