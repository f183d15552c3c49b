//! Request forwarding and streaming response relay.
//!
//! # Responsibilities
//! - Rebuild the inbound request against the upstream base URL
//! - Inject the server-held credential as the `key` query parameter
//! - Stream the request body up and the response body back without
//!   buffering either
//!
//! # Design Decisions
//! - The upstream response is relayed verbatim, including non-2xx
//!   statuses; clients must see the real API error
//! - Transport failures map to fixed 502/504 responses with generic
//!   bodies, never surfacing internals that might include the credential
//! - No retries: generation calls are not idempotent

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::response::Response;
use http_body::Body as _;
use url::Url;

use crate::error::ProxyError;
use crate::http::headers;
use crate::http::server::AppState;

/// Path prefix marking a request as proxyable. Mirrors the upstream
/// API's own version prefix so client SDKs work by swapping the host.
pub const PROXY_PREFIX: &str = "/v1beta";

/// Query parameter the upstream expects the credential in.
const CREDENTIAL_PARAM: &str = "key";

/// Proxy handler for `/v1beta/{*path}`.
///
/// The auth gate has already run; anything arriving here is allowed.
/// The raw URI path is used rather than the decoded route capture so
/// percent-encoded segments reach the upstream byte-identical.
pub async fn forward(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let inbound_path = parts.uri.path().to_string();

    let target = build_upstream_url(
        &state.config.upstream_base_url,
        &inbound_path,
        parts.uri.query(),
        &state.config.api_key,
    )?;

    tracing::debug!(method = %method, path = %inbound_path, "Forwarding request upstream");

    let mut outbound = state
        .client
        .request(method.clone(), target)
        .headers(headers::outbound_request_headers(&parts.headers));
    if has_request_body(&parts, &body) {
        // Stream the body through; never buffer uploads in memory.
        outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    let upstream = outbound.send().await.map_err(|err| {
        let mapped = ProxyError::from_upstream(&err);
        tracing::error!(
            method = %method,
            path = %inbound_path,
            error = %mapped,
            "Upstream call failed"
        );
        mapped
    })?;

    let status = upstream.status();
    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = %inbound_path,
            status = %status,
            "Upstream returned an error status, relaying verbatim"
        );
    } else {
        tracing::debug!(method = %method, path = %inbound_path, status = %status, "Relaying upstream response");
    }

    Ok(relay_response(upstream))
}

/// Turn the upstream response into a client response, streaming the body
/// chunk-by-chunk as it arrives. Dropping the returned body (client
/// disconnect) drops the underlying upstream connection with it.
fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let relayed_headers = headers::relayed_response_headers(upstream.headers());

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = relayed_headers;
    response
}

/// Whether the inbound request carries a body worth streaming upstream.
///
/// Attaching an empty chunked body to bodiless methods (GET, DELETE)
/// confuses some upstream servers, so a body is only forwarded when one
/// is actually present. Framing headers alone are not enough to decide:
/// HTTP/2 forbids `Transfer-Encoding` and streamed h2 uploads carry no
/// `Content-Length`, so the body itself is consulted too.
fn has_request_body(parts: &Parts, body: &Body) -> bool {
    let declared_length = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    matches!(declared_length, Some(len) if len > 0)
        || parts.headers.contains_key(header::TRANSFER_ENCODING)
        || !body.is_end_stream()
}

/// Concatenate the upstream base with the inbound path (prefix
/// included) and original query string, then attach the credential,
/// overriding any client-supplied `key` pair.
fn build_upstream_url(
    base: &str,
    path: &str,
    query: Option<&str>,
    api_key: &str,
) -> Result<Url, ProxyError> {
    let joined = format!("{}{}", base.trim_end_matches('/'), path);
    let mut url = Url::parse(&joined).map_err(|_| ProxyError::BadOutboundRequest)?;

    // The parser normalizes dot segments, so a path like
    // `/v1beta/../v1/x` would otherwise slip past the route match and
    // reach upstream paths outside the prefix.
    let within_prefix = url
        .path()
        .strip_prefix(PROXY_PREFIX)
        .map(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(false);
    if !within_prefix {
        return Err(ProxyError::NotFound);
    }

    {
        let mut pairs = url.query_pairs_mut();
        if let Some(query) = query {
            for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
                if name != CREDENTIAL_PARAM {
                    pairs.append_pair(&name, &value);
                }
            }
        }
        pairs.append_pair(CREDENTIAL_PARAM, api_key);
    }
    Ok(url)
}
