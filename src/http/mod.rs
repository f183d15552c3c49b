//! HTTP relay subsystem.
//!
//! # Data Flow
//! ```text
//! Client request
//!     → server.rs (Axum setup, routing: /health, /v1beta/*, fallback)
//!     → auth gate (middleware, proxy routes only)
//!     → forward.rs (rebuild request, inject credential, send upstream)
//!     → headers.rs (strip hop-by-hop + secret headers both directions)
//!     → streamed response back to client
//! ```

pub mod forward;
pub mod headers;
pub mod server;

pub use server::{AppState, HttpServer};
