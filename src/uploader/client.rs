use crate::config::ApiConfig;
use crate::error::{IndexerError, Result};
use crate::uploader::outcome::{FailureReason, SubmitOutcome};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Anything that can push one URL to the index.
pub trait Submit {
    fn submit(&self, url: &str) -> SubmitOutcome;
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexRequest<'a> {
    pub widget_id: &'a str,
    pub url: Vec<UrlEntry<'a>>,
    #[serde(rename = "sourceType")]
    pub source_type: &'a str,
    pub import_full_website: bool,
    #[serde(rename = "dataTypeIds")]
    pub data_type_ids: Vec<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlEntry<'a> {
    pub url: &'a str,
    #[serde(rename = "isForceUpdate")]
    pub is_force_update: bool,
}

/// Outcome of one request plus what the server actually said.
#[derive(Debug, Clone)]
pub struct Submission {
    pub outcome: SubmitOutcome,
    pub status: Option<u16>,
    pub body: Option<String>,
    pub duration: Duration,
}

pub struct Uploader {
    client: Client,
    endpoint: String,
    widget_id: String,
    data_type_id: String,
    source_type: String,
}

impl Uploader {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(build_headers(api)?)
            .timeout(api.request_timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: api.endpoint.clone(),
            widget_id: api.widget_id.clone(),
            data_type_id: api.data_type_id.clone(),
            source_type: api.source_type.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn payload<'a>(&'a self, url: &'a str) -> IndexRequest<'a> {
        IndexRequest {
            widget_id: &self.widget_id,
            url: vec![UrlEntry {
                url,
                is_force_update: false,
            }],
            source_type: &self.source_type,
            import_full_website: false,
            data_type_ids: vec![&self.data_type_id],
        }
    }

    /// Sends exactly one request for `url`. Never retries.
    pub fn submit_detailed(&self, url: &str) -> Submission {
        let started = Instant::now();
        let result = self
            .client
            .post(&self.endpoint)
            .json(&self.payload(url))
            .send();

        let submission = match result {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().ok();
                Submission {
                    outcome: SubmitOutcome::from_status(status),
                    status: Some(status),
                    body,
                    duration: started.elapsed(),
                }
            }
            Err(e) => {
                let outcome = if e.is_timeout() {
                    SubmitOutcome::Failed(FailureReason::Timeout)
                } else {
                    SubmitOutcome::transport_error(&e.to_string())
                };
                Submission {
                    outcome,
                    status: None,
                    body: None,
                    duration: started.elapsed(),
                }
            }
        };

        tracing::debug!(
            url,
            status = ?submission.status,
            outcome = %submission.outcome.message(),
            elapsed_ms = submission.duration.as_millis() as u64,
            "submitted URL"
        );

        submission
    }
}

impl Submit for Uploader {
    fn submit(&self, url: &str) -> SubmitOutcome {
        self.submit_detailed(url).outcome
    }
}

fn build_headers(api: &ApiConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (name, value) in &api.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| IndexerError::HttpClient {
                message: format!("invalid header name '{}'", name),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|_| IndexerError::HttpClient {
            message: format!("invalid value for header '{}'", name),
        })?;
        headers.insert(header_name, header_value);
    }

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", api.auth_token.trim())).map_err(
        |_| IndexerError::HttpClient {
            message: "auth token contains characters not allowed in a header".to_string(),
        },
    )?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    Ok(headers)
}
