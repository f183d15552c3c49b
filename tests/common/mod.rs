//! Shared stub upstreams and proxy harness for integration tests.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use gemini_proxy::{HttpServer, ProxyConfig, Shutdown};

/// Credential injected by every test proxy instance.
pub const TEST_CREDENTIAL: &str = "test-credential";

/// One request as observed by a stub upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decoded query pairs, in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

/// A stub upstream that records everything it receives.
pub struct StubUpstream {
    pub addr: SocketAddr,
    requests: RequestLog,
}

impl StubUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(log: &RequestLog, request: Request) -> RecordedRequest {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect(),
        body: bytes.to_vec(),
    };
    log.lock().unwrap().push(recorded.clone());
    recorded
}

fn spawn_stub(router: Router, requests: RequestLog) -> StubUpstream {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let addr = std_listener.local_addr().unwrap();
    let listener = TcpListener::from_std(std_listener).unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    StubUpstream { addr, requests }
}

/// Stub upstream that echoes the request body back with the inbound
/// content type and status 200.
pub async fn start_echo_upstream() -> StubUpstream {
    let requests: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();
    let router = Router::new()
        .fallback(
            |State(log): State<RequestLog>, request: Request| async move {
                let recorded = record(&log, request).await;
                let content_type = recorded
                    .header("content-type")
                    .unwrap_or("application/octet-stream")
                    .to_string();
                Response::builder()
                    .status(StatusCode::OK)
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(recorded.body))
                    .unwrap()
            },
        )
        .with_state(log);
    spawn_stub(router, requests)
}

/// Stub upstream that always answers with a fixed status and body.
pub async fn start_status_upstream(status: u16, body: &'static str) -> StubUpstream {
    let requests: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();
    let router = Router::new()
        .fallback(
            move |State(log): State<RequestLog>, request: Request| async move {
                record(&log, request).await;
                Response::builder()
                    .status(StatusCode::from_u16(status).unwrap())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap()
            },
        )
        .with_state(log);
    spawn_stub(router, requests)
}

/// Stub upstream that sleeps before answering, to trip the proxy's
/// upstream timeout.
pub async fn start_slow_upstream(delay: Duration) -> StubUpstream {
    let requests: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();
    let router = Router::new()
        .fallback(
            move |State(log): State<RequestLog>, request: Request| async move {
                record(&log, request).await;
                tokio::time::sleep(delay).await;
                StatusCode::OK
            },
        )
        .with_state(log);
    spawn_stub(router, requests)
}

/// Raw-TCP upstream that serves a chunked event-stream response, one
/// chunk per write with a delay in between, so chunk boundaries survive
/// to the client if the proxy streams instead of buffering.
pub async fn start_chunked_upstream(
    chunks: &'static [&'static str],
    delay: Duration,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                // Drain the request head before responding.
                let mut head = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\n\
                          Content-Type: text/event-stream\r\n\
                          Transfer-Encoding: chunked\r\n\
                          Connection: close\r\n\r\n",
                    )
                    .await;
                for chunk in chunks {
                    let framed = format!("{:x}\r\n{}\r\n", chunk.len(), chunk);
                    let _ = socket.write_all(framed.as_bytes()).await;
                    let _ = socket.flush().await;
                    tokio::time::sleep(delay).await;
                }
                let _ = socket.write_all(b"0\r\n\r\n").await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Raw-TCP upstream that streams event chunks until its connection
/// dies, flipping the returned flag once the proxy-side socket is torn
/// down. Used to observe that a client disconnect propagates to the
/// in-flight upstream call.
pub async fn start_endless_chunked_upstream() -> (SocketAddr, Arc<AtomicBool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let closed = Arc::new(AtomicBool::new(false));
    let flag = closed.clone();

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let flag = flag.clone();
            tokio::spawn(async move {
                let (mut rd, mut wr) = socket.into_split();

                // Drain the request head before responding.
                let mut head = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    match rd.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                if wr
                    .write_all(
                        b"HTTP/1.1 200 OK\r\n\
                          Content-Type: text/event-stream\r\n\
                          Transfer-Encoding: chunked\r\n\r\n",
                    )
                    .await
                    .is_err()
                {
                    flag.store(true, Ordering::SeqCst);
                    return;
                }

                let payload = "data: {\"text\":\"tick\"}\n\n";
                let framed = format!("{:x}\r\n{}\r\n", payload.len(), payload);
                loop {
                    tokio::select! {
                        // The proxy sends nothing further on this
                        // connection; a completed read means it closed.
                        _ = rd.read(&mut buf) => break,
                        _ = tokio::time::sleep(Duration::from_millis(25)) => {
                            if wr.write_all(framed.as_bytes()).await.is_err() {
                                break;
                            }
                            let _ = wr.flush().await;
                        }
                    }
                }
                flag.store(true, Ordering::SeqCst);
            });
        }
    });

    (addr, closed)
}

/// Proxy configuration pointing at a stub upstream.
pub fn proxy_config(upstream_base: &str, app_token: Option<&str>) -> ProxyConfig {
    ProxyConfig {
        bind_address: "127.0.0.1:0".to_string(),
        upstream_base_url: upstream_base.trim_end_matches('/').to_string(),
        api_key: TEST_CREDENTIAL.to_string(),
        app_token: app_token.map(str::to_string),
        timeouts: Default::default(),
    }
}

/// Start the real proxy on an ephemeral port. Returns its base URL and
/// the shutdown handle keeping it alive.
pub async fn start_proxy(config: ProxyConfig) -> (String, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (format!("http://{}", addr), shutdown)
}

/// HTTP client that talks straight to the local proxy.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
