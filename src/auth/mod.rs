//! App-token authentication gate.
//!
//! # Responsibilities
//! - Compare the inbound `X-App-Token` header against the configured token
//! - Short-circuit with 401 before any upstream call on mismatch
//! - Allow everything when no token is configured (insecure mode)
//!
//! # Design Decisions
//! - Constant-time comparison to avoid timing side-channels on the secret
//! - The submitted token value is never logged or echoed back

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use subtle::ConstantTimeEq;

use crate::error::ProxyError;
use crate::http::server::AppState;

/// Header clients use to authenticate against this proxy. Stripped from
/// outbound requests; the upstream never sees it.
pub const APP_TOKEN_HEADER: &str = "x-app-token";

fn token_matches(provided: &str, expected: &str) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Axum middleware guarding the proxy routes.
pub async fn app_token_gate(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, ProxyError> {
    let Some(expected) = state.config.app_token.as_deref() else {
        // Insecure mode: no token configured, gate is disabled.
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(APP_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(token) if token_matches(token, expected) => Ok(next.run(request).await),
        _ => {
            tracing::warn!(
                client = %addr.ip(),
                path = %request.uri().path(),
                "Rejected request with invalid or missing app token"
            );
            Err(ProxyError::Auth)
        }
    }
}
