//! Gemini API forwarding proxy.
//!
//! A transparent proxy in front of Google's generative language API.
//! Clients authenticate with a shared `X-App-Token`; the proxy injects
//! the server-held API key into every forwarded call and streams
//! responses back unmodified.
//!
//! ```text
//! client → auth gate → request forwarder → upstream → response relay → client
//! ```

use tokio::net::TcpListener;

use gemini_proxy::config;
use gemini_proxy::http::HttpServer;
use gemini_proxy::lifecycle::{signals, Shutdown};
use gemini_proxy::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = config::load_from_env()?;

    tracing::info!(
        bind_address = %config.bind_address,
        upstream = %config.upstream_base_url,
        auth_enabled = config.app_token.is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.app_token.is_none() {
        tracing::warn!(
            "APP_TOKEN not set: authentication is DISABLED and every request will be forwarded upstream"
        );
    }

    let listener = TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
