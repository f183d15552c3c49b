//! Observability subsystem.
//!
//! Structured logging via the tracing crate. Request IDs are attached by
//! the server middleware and flow through all log events; secrets (the
//! upstream credential, submitted app tokens) are never logged.

pub mod logging;
