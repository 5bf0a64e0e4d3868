//! Common test utilities: an in-process stand-in for the matching service.
//!
//! The mock server records every request it receives (method, path, raw
//! query, multipart fields, JSON body) and answers with per-path canned
//! responses, so tests can assert the exact wire shape of each operation.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::subscriber::DefaultGuard;

use topomatch_core::{Config, TopomatchClient};

/// One multipart field as the server saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub fields: Vec<ReceivedField>,
    pub json: Option<Value>,
}

impl ReceivedRequest {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn is_multipart(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    }
}

/// Canned response for one path.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl CannedResponse {
    pub fn json(value: Value) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "application/json",
            body: serde_json::to_vec(&value).unwrap(),
        }
    }

    pub fn bytes(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type,
            body,
        }
    }

    pub fn status(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: json!({ "detail": body }).to_string().into_bytes(),
        }
    }
}

#[derive(Clone, Default)]
struct ServerState {
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
    responses: Arc<Mutex<HashMap<String, CannedResponse>>>,
}

/// Mock matching service bound to an ephemeral local port.
pub struct MockServer {
    pub base_url: String,
    state: ServerState,
    handle: tokio::task::JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        Self::start_with_prefix("").await
    }

    /// Start a server whose client base URL carries `prefix` (e.g. "/api").
    pub async fn start_with_prefix(prefix: &str) -> Self {
        let state = ServerState::default();
        let app = Router::new()
            .fallback(record_request)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{}{}", addr, prefix),
            state,
            handle,
        }
    }

    /// Answer requests to `path` with `response` from now on.
    pub fn respond(&self, path: &str, response: CannedResponse) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert(path.to_string(), response);
    }

    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// The single request received so far; panics if there were more or fewer.
    pub fn only_request(&self) -> ReceivedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {:?}", requests);
        requests.into_iter().next().unwrap()
    }

    pub fn client(&self) -> TopomatchClient {
        self.client_with(Config::with_base_url(self.base_url.clone()))
    }

    /// Client for this server with a custom config; the base URL is overwritten.
    pub fn client_with(&self, mut config: Config) -> TopomatchClient {
        config.api_base_url = Some(self.base_url.clone());
        TopomatchClient::new(&config).expect("Failed to build client")
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record_request(State(state): State<ServerState>, req: Request) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut fields = Vec::new();
    let mut json = None;

    if content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .expect("invalid multipart request");
        while let Some(field) = multipart.next_field().await.expect("invalid multipart field") {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let field_type = field.content_type().map(str::to_string);
            let len = field.bytes().await.expect("unreadable field").len();
            fields.push(ReceivedField {
                name,
                file_name,
                content_type: field_type,
                len,
            });
        }
    } else {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .expect("unreadable body");
        json = serde_json::from_slice(&bytes).ok();
    }

    state.requests.lock().unwrap().push(ReceivedRequest {
        method,
        path: path.clone(),
        query,
        content_type,
        fields,
        json,
    });

    let canned = state
        .responses
        .lock()
        .unwrap()
        .get(&path)
        .cloned()
        .unwrap_or_else(|| CannedResponse::json(json!({ "status": "ok" })));

    (
        canned.status,
        [(header::CONTENT_TYPE, canned.content_type)],
        Body::from(canned.body),
    )
        .into_response()
}

/// A base URL nothing listens on.
pub fn unreachable_base_url() -> String {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    format!("http://127.0.0.1:{}", port)
}

/// Captures formatted log output of the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// Install as the thread's default subscriber, recording `ERROR` events.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.contains("ERROR"))
            .collect()
    }
}
