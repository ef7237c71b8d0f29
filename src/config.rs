use crate::error::{IndexerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable consulted for the bearer token.
pub const TOKEN_ENV_VAR: &str = "URL_INDEXER_TOKEN";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub rate_limit: RateLimitConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub widget_id: String,
    pub data_type_id: String,
    pub source_type: String,
    pub auth_token: String,
    pub timeout_secs: u64,
    /// Extra headers sent with every request. The service checks these
    /// against the dashboard origin.
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub batch_size: usize,
    pub pause_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: Option<PathBuf>,
    /// Header name of the column holding the URL. When unset only the
    /// `,""http...""` marker scan is used.
    pub url_column: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let headers = [
            ("accept", "application/json, text/plain, */*"),
            ("accept-language", "en-GB,en-US;q=0.9,en;q=0.8"),
            ("cache-control", "no-cache"),
            ("origin", "https://app.auralis.ai"),
            ("pragma", "no-cache"),
            ("referer", "https://app.auralis.ai/"),
            ("x-auralis-app", "dashboard"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            endpoint: "https://ae-backend-dashboard-service-prod.api.auralis.ai/learning-center/index"
                .to_string(),
            widget_id: "d64219b2-eaf8-4599-8c43-4d5155909a0c".to_string(),
            data_type_id: "669b9227-fc26-4f18-b38d-5953883742b7".to_string(),
            source_type: "web".to_string(),
            auth_token: String::new(),
            timeout_secs: 30,
            headers,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            pause_seconds: 180, // 3 minutes
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(IndexerError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| IndexerError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| IndexerError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["url-indexer.toml", ".url-indexer.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref endpoint) = cli_args.endpoint {
            self.api.endpoint = endpoint.clone();
        }

        if let Some(ref token) = cli_args.auth_token {
            self.api.auth_token = token.trim().to_string();
        }

        if let Some(timeout) = cli_args.timeout {
            self.api.timeout_secs = timeout;
        }

        if let Some(batch_size) = cli_args.batch_size {
            self.rate_limit.batch_size = batch_size;
        }

        if let Some(pause) = cli_args.pause_seconds {
            self.rate_limit.pause_seconds = pause;
        }

        if let Some(ref input) = cli_args.input {
            self.input.path = Some(input.clone());
        }

        if let Some(ref column) = cli_args.url_column {
            self.input.url_column = Some(column.clone());
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| IndexerError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let endpoint = Url::parse(&self.api.endpoint).map_err(|_| IndexerError::InvalidUrl {
            url: self.api.endpoint.clone(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(IndexerError::InvalidUrl {
                url: self.api.endpoint.clone(),
            });
        }

        if self.api.widget_id.trim().is_empty() || self.api.data_type_id.trim().is_empty() {
            return Err(IndexerError::Config {
                message: "Both widget_id and data_type_id must be set".to_string(),
            });
        }

        if self.api.auth_token.trim().is_empty() {
            return Err(IndexerError::Config {
                message: format!(
                    "No auth token configured. Set {} or pass --token",
                    TOKEN_ENV_VAR
                ),
            });
        }

        if self.api.timeout_secs == 0 {
            return Err(IndexerError::Config {
                message: "Request timeout must be greater than 0".to_string(),
            });
        }

        if self.rate_limit.batch_size == 0 {
            return Err(IndexerError::Config {
                message: "Batch size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Token with everything past the first few characters masked, for display.
    pub fn redacted_token(&self) -> String {
        let token = &self.api.auth_token;
        if token.is_empty() {
            return "<unset>".to_string();
        }
        let visible: String = token.chars().take(6).collect();
        format!("{}…", visible)
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub auth_token: Option<String>,
    pub timeout: Option<u64>,
    pub batch_size: Option<usize>,
    pub pause_seconds: Option<u64>,
    pub input: Option<PathBuf>,
    pub url_column: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_batch_size(mut self, batch_size: Option<usize>) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_pause_seconds(mut self, pause: Option<u64>) -> Self {
        self.pause_seconds = pause;
        self
    }

    pub fn with_input(mut self, input: Option<PathBuf>) -> Self {
        self.input = input;
        self
    }

    pub fn with_url_column(mut self, column: Option<String>) -> Self {
        self.url_column = column;
        self
    }
}
