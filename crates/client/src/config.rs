//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `QKART_API_ENDPOINT` - Backend API base URL (default: `http://localhost:8082/api/v1`)
//! - `QKART_SESSION_FILE` - Where the login session is kept (default: `$HOME/.qkart/session.json`)
//! - `QKART_SEARCH_DEBOUNCE_MS` - Quiet window for search-as-you-type (default: 500)
//! - `QKART_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `QKART_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_ENDPOINT: &str = "http://localhost:8082/api/v1";
const DEFAULT_SESSION_FILE: &str = ".qkart/session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// QKart client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API base URL, always ending in `/`
    pub api_endpoint: Url,
    /// Path of the persisted session file
    pub session_file: PathBuf,
    /// Quiet window before a search request is issued
    pub search_debounce: Duration,
    /// How long catalog listings stay cached
    pub catalog_cache_ttl: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_endpoint = parse_endpoint(&get_env_or_default(
            "QKART_API_ENDPOINT",
            DEFAULT_API_ENDPOINT,
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("QKART_API_ENDPOINT".to_string(), e))?;

        let session_file = get_optional_env("QKART_SESSION_FILE")
            .map_or_else(default_session_file, PathBuf::from);

        let search_debounce =
            Duration::from_millis(get_parsed_env("QKART_SEARCH_DEBOUNCE_MS", 500)?);
        let catalog_cache_ttl =
            Duration::from_secs(get_parsed_env("QKART_CATALOG_CACHE_TTL_SECS", 300)?);
        let request_timeout =
            Duration::from_secs(get_parsed_env("QKART_REQUEST_TIMEOUT_SECS", 30)?);

        Ok(Self {
            api_endpoint,
            session_file,
            search_debounce,
            catalog_cache_ttl,
            request_timeout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }

    /// Configuration for a given endpoint with every other setting defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `endpoint` is not an http(s) URL.
    pub fn for_endpoint(endpoint: &str) -> Result<Self, ConfigError> {
        let api_endpoint = parse_endpoint(endpoint)
            .map_err(|e| ConfigError::InvalidEnvVar("QKART_API_ENDPOINT".to_string(), e))?;

        Ok(Self {
            api_endpoint,
            session_file: default_session_file(),
            search_debounce: Duration::from_millis(500),
            catalog_cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
            sentry_dsn: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the API endpoint and make sure relative paths join beneath it.
fn parse_endpoint(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Session file under the user's home directory, or the working directory.
fn default_session_file() -> PathBuf {
    get_optional_env("HOME").map_or_else(
        || PathBuf::from(DEFAULT_SESSION_FILE),
        |home| PathBuf::from(home).join(DEFAULT_SESSION_FILE),
    )
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed into `T`, or the default when unset.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| {
        value
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_adds_trailing_slash() {
        let url = parse_endpoint("http://localhost:8082/api/v1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8082/api/v1/");
        assert_eq!(
            url.join("products").unwrap().as_str(),
            "http://localhost:8082/api/v1/products"
        );
    }

    #[test]
    fn test_parse_endpoint_keeps_trailing_slash() {
        let url = parse_endpoint("https://qkart.example.com/api/v1/").unwrap();
        assert_eq!(url.as_str(), "https://qkart.example.com/api/v1/");
    }

    #[test]
    fn test_parse_endpoint_rejects_other_schemes() {
        let err = parse_endpoint("ftp://example.com/api").unwrap_err();
        assert!(err.contains("ftp"));
    }

    #[test]
    fn test_parse_endpoint_rejects_garbage() {
        assert!(parse_endpoint("not a url").is_err());
    }

    #[test]
    fn test_for_endpoint_defaults() {
        let config = ClientConfig::for_endpoint("http://127.0.0.1:9000/api/v1").unwrap();
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.sentry_dsn.is_none());
        assert!(config.session_file.ends_with(".qkart/session.json"));
    }

    #[test]
    fn test_for_endpoint_invalid() {
        let err = ClientConfig::for_endpoint("mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
