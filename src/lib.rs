//! Transparent forwarding proxy for the Gemini generative language API.
//!
//! Clients talk to this proxy instead of the upstream API. The proxy
//! authenticates them with a shared app token, injects the server-held
//! API key into every outbound call, and relays responses byte-for-byte,
//! including incremental event streams.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
