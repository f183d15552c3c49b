//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Init logging → Load config → Bind listener → Serve
//!
//! Shutdown:
//!     SIGINT/Ctrl+C (signals.rs) → Shutdown broadcast (shutdown.rs)
//!     → axum graceful shutdown → in-flight requests drain → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
