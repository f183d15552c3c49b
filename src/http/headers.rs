//! Header filtering at the proxy boundary.
//!
//! Hop-by-hop headers are meaningful only for a single connection leg
//! and must never be copied across the proxy. The app-token header is
//! this proxy's own authentication and must never reach the upstream.

use axum::http::header::{self, HeaderMap, HeaderName};

use crate::auth::APP_TOKEN_HEADER;

const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    // `keep-alive` has no constant in the http crate.
    HOP_BY_HOP_HEADERS.contains(name) || name.as_str() == "keep-alive"
}

/// Build the outbound header map from the inbound request headers.
///
/// Drops hop-by-hop headers, `Host` (the client addressed the proxy,
/// not the upstream), `Content-Length` (the outbound client frames the
/// streamed body itself) and the app-token header. Repeated headers are
/// preserved in order.
pub fn outbound_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, value) in inbound {
        if is_hop_by_hop(name)
            || name == header::HOST
            || name == header::CONTENT_LENGTH
            || name.as_str() == APP_TOKEN_HEADER
        {
            continue;
        }
        filtered.append(name.clone(), value.clone());
    }
    filtered
}

/// Build the client-facing header map from the upstream response headers.
///
/// Drops hop-by-hop headers plus `Content-Length`: the relay streams the
/// body, so the server re-frames the transfer itself. A stale length
/// from upstream would corrupt client-side parsing.
pub fn relayed_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, value) in upstream {
        if is_hop_by_hop(name) || name == header::CONTENT_LENGTH {
            continue;
        }
        filtered.append(name.clone(), value.clone());
    }
    filtered
}
