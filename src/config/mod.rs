//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variables
//!     → loader.rs (read, parse, validate)
//!     → schema.rs (immutable ProxyConfig)
//!     → injected into HttpServer / handlers via AppState
//! ```
//!
//! # Design Decisions
//! - Loaded exactly once at startup; immutable for the process lifetime
//! - Passed explicitly into the pipeline so tests can inject their own
//! - Startup fails fast on a missing credential or malformed values

pub mod loader;
pub mod schema;

pub use loader::{load_from_env, ConfigError};
pub use schema::{ProxyConfig, TimeoutConfig, DEFAULT_UPSTREAM_BASE};
