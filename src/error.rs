//! Error taxonomy for the relay path.
//!
//! # Design Decisions
//! - Every variant maps to a fixed status and a fixed generic body;
//!   transport error internals and secrets never reach the client
//! - Upstream non-2xx responses are NOT errors here: they are relayed
//!   verbatim so clients see the real API error

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors the proxy decides locally or at the forwarder boundary.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing or mismatched app token.
    #[error("invalid or missing app token")]
    Auth,

    /// Path outside the proxy prefix and not the liveness route.
    #[error("no matching route")]
    NotFound,

    /// Upstream unreachable (connect failure, DNS, transport error).
    #[error("upstream request failed")]
    UpstreamUnavailable,

    /// Upstream did not respond within the configured deadline.
    #[error("upstream timed out")]
    UpstreamTimeout,

    /// The outbound request could not be constructed.
    #[error("could not build upstream request")]
    BadOutboundRequest,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl ProxyError {
    /// Status code presented to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Auth => StatusCode::UNAUTHORIZED,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::BadOutboundRequest => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed client-facing message. Deliberately static: error bodies
    /// must never carry upstream internals or configured secrets.
    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::Auth => "Unauthorized: invalid or missing token",
            ProxyError::NotFound => "Not found",
            ProxyError::UpstreamUnavailable => "Bad gateway: upstream request failed",
            ProxyError::UpstreamTimeout => "Gateway timeout: upstream did not respond in time",
            ProxyError::BadOutboundRequest => "Internal error",
        }
    }

    /// Classify a transport-level failure from the outbound client.
    pub fn from_upstream(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::UpstreamTimeout
        } else {
            ProxyError::UpstreamUnavailable
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
