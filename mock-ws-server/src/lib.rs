//! In-process recording HTTP server for connector tests.
//!
//! Binds to a random localhost port, answers every route from a queue of
//! canned [`MockResponse`]s, and records each inbound request (method,
//! path with query, headers, raw body) for later assertions.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    responses: VecDeque<MockResponse>,
    requests: VecDeque<RecordedRequest>,
}

type Shared = Arc<Mutex<Inner>>;

/// A canned response to hand out for one inbound request.
///
/// Defaults to status 200 with an empty body.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResponse {
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }
}

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string, e.g. `/api/issues/search?ps=100`.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// First value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body decoded lossily as UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The mock server. Dropped servers stop accepting connections when the
/// owning runtime shuts down.
pub struct MockWebServer {
    addr: SocketAddr,
    state: Shared,
}

impl MockWebServer {
    /// Bind to `127.0.0.1:0` and start serving on the current runtime.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("listener has no local addr");

        let state: Shared = Arc::new(Mutex::new(Inner::default()));
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL of the server, with a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Queue a canned response; responses are handed out in FIFO order.
    pub async fn enqueue(&self, response: MockResponse) {
        self.state.lock().await.responses.push_back(response);
    }

    /// Take the oldest recorded request, if any inbound call happened.
    pub async fn take_request(&self) -> Option<RecordedRequest> {
        self.state.lock().await.requests.pop_front()
    }
}

async fn handle(State(state): State<Shared>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string()),
        headers: parts.headers,
        body,
    };

    let canned = {
        let mut inner = state.lock().await;
        inner.requests.push_back(recorded);
        inner.responses.pop_front().unwrap_or_else(MockResponse::new)
    };

    let mut response = Response::builder()
        .status(StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));
    for (name, value) in &canned.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            response = response.header(name, value);
        }
    }
    response
        .body(Body::from(canned.body))
        .expect("canned response should build")
}
