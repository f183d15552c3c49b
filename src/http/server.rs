//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: liveness route, proxy routes, 404 fallback
//! - Apply the auth gate to the proxy routes only
//! - Wire up middleware (tracing, request ID, CORS)
//! - Build the pooled outbound client with the configured timeouts
//! - Serve with graceful shutdown

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::forward;

/// Application state injected into handlers.
///
/// Immutable configuration plus the pooled outbound client. Cloning is
/// cheap; both members are reference-counted internally.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub client: reqwest::Client,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails only if the outbound TLS client cannot be constructed.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// Create a server around an already-built outbound client.
    pub fn with_client(config: ProxyConfig, client: reqwest::Client) -> Self {
        let state = AppState {
            config: Arc::new(config),
            client,
        };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        // Only the proxy routes sit behind the auth gate; the liveness
        // route and the 404 fallback stay open.
        let proxy_routes = Router::new()
            .route(
                &format!("{}/{{*path}}", forward::PROXY_PREFIX),
                any(forward::forward),
            )
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::app_token_gate,
            ));

        Router::new()
            .route("/health", get(health))
            .merge(proxy_routes)
            .fallback(not_found)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(CorsLayer::permissive())
    }

    /// Run the server on the given listener until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

/// Liveness endpoint. Unauthenticated, no upstream interaction.
async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            service: "gemini-proxy",
        }),
    )
}

/// The proxy exposes no routes besides the liveness check and the proxy
/// prefix; everything else is a 404.
async fn not_found(request: Request) -> impl IntoResponse {
    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        "No matching route"
    );
    ProxyError::NotFound
}
