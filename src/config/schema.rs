//! Configuration schema definitions.

/// Default upstream base URL (Google's generative language API).
pub const DEFAULT_UPSTREAM_BASE: &str = "https://generativelanguage.googleapis.com";

/// Root configuration for the proxy.
///
/// Built once at startup and shared read-only across all requests.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Upstream base URL, scheme and authority only (no trailing slash).
    pub upstream_base_url: String,

    /// Server-held upstream credential, attached to every outbound call
    /// as the `key` query parameter. Never sent to clients or logged.
    pub api_key: String,

    /// Expected `X-App-Token` value. `None` disables the auth gate
    /// entirely; every request is forwarded (insecure mode).
    pub app_token: Option<String>,

    /// Timeout settings for outbound calls.
    pub timeouts: TimeoutConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            upstream_base_url: DEFAULT_UPSTREAM_BASE.to_string(),
            api_key: String::new(),
            app_token: None,
            timeouts: TimeoutConfig::default(),
        }
    }
}

/// Timeout configuration for outbound upstream calls.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total request timeout in seconds. Generation calls and event
    /// streams can run for minutes, so this is deliberately generous.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 300,
        }
    }
}
