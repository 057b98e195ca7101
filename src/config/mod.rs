//! Configuration module for the heroes backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default tag written on every imported country record.
pub const DEFAULT_IMPORT_AUTHOR: &str = "ISABENSA";

/// Default owner written on superhero records created through the app.
pub const DEFAULT_RECORD_AUTHOR: &str = "Isabel";

/// Public endpoint serving the full country list.
pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all";

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {name}: {value:?} ({reason})")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log line format
    pub log_format: LogFormat,
    /// Upstream country list endpoint
    pub countries_url: String,
    /// Whether to ask the upstream for only the fields the mapper reads
    pub select_fields: bool,
    /// Per-request timeout for upstream calls
    pub fetch_timeout: Duration,
    /// Total attempts before an upstream fetch is considered failed
    pub fetch_max_attempts: u32,
    /// Delay before the first retry; doubles on each further attempt
    pub fetch_retry_delay: Duration,
    /// Author tag identifying imported country records
    pub import_author: String,
    /// Author stored on superhero records
    pub default_author: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("HEROES_DB_PATH")
            .unwrap_or_else(|_| "./data/heroes.sqlite".to_string())
            .into();

        let bind_addr = parse_var("HEROES_BIND_ADDR", "127.0.0.1:3000")?;

        let log_level = env::var("HEROES_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("HEROES_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(other) => {
                return Err(ConfigError {
                    name: "HEROES_LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected \"pretty\" or \"json\"".to_string(),
                })
            }
        };

        let countries_url =
            env::var("HEROES_COUNTRIES_URL").unwrap_or_else(|_| DEFAULT_COUNTRIES_URL.to_string());

        let select_fields: bool = parse_var("HEROES_SELECT_FIELDS", "true")?;

        let timeout_secs: u64 = parse_var("HEROES_FETCH_TIMEOUT_SECS", "60")?;
        let fetch_max_attempts: u32 = parse_var("HEROES_FETCH_MAX_ATTEMPTS", "5")?;
        if fetch_max_attempts == 0 {
            return Err(ConfigError {
                name: "HEROES_FETCH_MAX_ATTEMPTS",
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }
        let retry_delay_ms: u64 = parse_var("HEROES_FETCH_RETRY_DELAY_MS", "500")?;

        let import_author = non_blank_var("HEROES_IMPORT_AUTHOR", DEFAULT_IMPORT_AUTHOR);
        let default_author = non_blank_var("HEROES_DEFAULT_AUTHOR", DEFAULT_RECORD_AUTHOR);

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_format,
            countries_url,
            select_fields,
            fetch_timeout: Duration::from_secs(timeout_secs),
            fetch_max_attempts,
            fetch_retry_delay: Duration::from_millis(retry_delay_ms),
            import_author,
            default_author,
        })
    }
}

fn parse_var<T>(name: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        name,
        value: value.clone(),
        reason: e.to_string(),
    })
}

fn non_blank_var(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
