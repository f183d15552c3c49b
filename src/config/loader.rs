//! Configuration loading from the environment.

use url::Url;

use crate::config::schema::{ProxyConfig, DEFAULT_UPSTREAM_BASE};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// GEMINI_API_KEY is unset or empty.
    MissingApiKey,
    /// PORT is not a valid TCP port.
    InvalidPort(String),
    /// UPSTREAM_BASE_URL is not a valid http(s) URL.
    InvalidUpstreamUrl(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingApiKey => {
                write!(f, "GEMINI_API_KEY must be set to the upstream credential")
            }
            ConfigError::InvalidPort(v) => write!(f, "PORT is not a valid port: {}", v),
            ConfigError::InvalidUpstreamUrl(v) => {
                write!(f, "UPSTREAM_BASE_URL is not a valid http(s) URL: {}", v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from process environment variables.
///
/// Recognized variables: `GEMINI_API_KEY` (required), `APP_TOKEN`,
/// `PORT`, `BIND_ADDRESS`, `UPSTREAM_BASE_URL`. An empty `APP_TOKEN`
/// counts as unset and disables authentication.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    from_lookup(|name| std::env::var(name).ok())
}

fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<ProxyConfig, ConfigError> {
    let api_key = lookup("GEMINI_API_KEY")
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingApiKey)?;

    let app_token = lookup("APP_TOKEN").filter(|v| !v.is_empty());

    let port = match lookup("PORT") {
        Some(raw) => raw
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(raw))?,
        None => 8000,
    };
    let host = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string());

    let upstream_base_url = match lookup("UPSTREAM_BASE_URL") {
        Some(raw) => validate_upstream_url(&raw)?,
        None => DEFAULT_UPSTREAM_BASE.to_string(),
    };

    Ok(ProxyConfig {
        bind_address: format!("{}:{}", host, port),
        upstream_base_url,
        api_key,
        app_token,
        timeouts: Default::default(),
    })
}

fn validate_upstream_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidUpstreamUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        _ => Err(ConfigError::InvalidUpstreamUrl(raw.to_string())),
    }
}
