//! Client for the external country list.
//!
//! Every call is bounded by a request timeout and a counted retry with
//! exponential backoff. A payload that cannot be decoded is terminal.

use std::time::Duration;

use thiserror::Error;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::ExternalCountry;

/// Fields the mapper reads; everything else is left on the server.
pub const SELECTED_FIELDS: &str =
    "name,capital,region,subregion,borders,area,population,gini,timezones,languages";

/// Upper bound for the delay between two attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Country source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// Connection failure or request timeout
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Unexpected status {status}")]
    Status { status: u16 },

    /// The body is not a country list
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Every attempt failed
    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<SourceError>,
    },
}

impl SourceError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Transport(_) | SourceError::Status { .. })
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        tracing::error!(error = %err, "Country source failed");
        AppError::Upstream(err.to_string())
    }
}

/// HTTP client for a restcountries-style endpoint.
#[derive(Debug, Clone)]
pub struct RestCountriesClient {
    http: reqwest::Client,
    url: String,
    select_fields: bool,
    max_attempts: u32,
    retry_delay: Duration,
}

impl RestCountriesClient {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("heroes-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            url: url.into(),
            select_fields: true,
            max_attempts: max_attempts.max(1),
            retry_delay,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self::new(
            config.countries_url.clone(),
            config.fetch_timeout,
            config.fetch_max_attempts,
            config.fetch_retry_delay,
        )?
        .with_field_selection(config.select_fields))
    }

    /// Toggle the `fields` query parameter.
    pub fn with_field_selection(mut self, enabled: bool) -> Self {
        self.select_fields = enabled;
        self
    }

    /// Fetch the full country list, retrying transient failures.
    pub async fn fetch_all(&self) -> Result<Vec<ExternalCountry>, SourceError> {
        let mut delay = self.retry_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.fetch_once().await {
                Ok(countries) => {
                    tracing::info!(count = countries.len(), attempt, "Fetched countries");
                    return Ok(countries);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= self.max_attempts => {
                    tracing::error!(
                        attempts = attempt,
                        error = %err,
                        "Country fetch failed permanently"
                    );
                    return Err(SourceError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Country fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, MAX_RETRY_DELAY);
                }
            }
        }
    }

    async fn fetch_once(&self) -> Result<Vec<ExternalCountry>, SourceError> {
        let mut request = self.http.get(&self.url);
        if self.select_fields {
            request = request.query(&[("fields", SELECTED_FIELDS)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
