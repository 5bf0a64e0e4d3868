//! HTTP transport bound to the matching service's base URL.
//!
//! One `Transport` is built at startup from validated configuration and
//! shared by every operation. It performs no retries: a failed call returns
//! its error immediately.

mod error;
mod progress;
mod types;

pub use error::ApiError;
pub(crate) use error::relay;
pub use progress::{progress_channel, ProgressEvent, ProgressReceiver, ProgressReporter};
pub use types::{BinaryResponse, Call, MatchResult, RequestBody, ResponseKind};

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{multipart, Client, Response, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::{validate_config, Config, ConfigError};
use crate::payload::ImageUpload;

use progress::progress_body;

#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    /// Base URL without trailing slash.
    base_url: String,
    chunk_size: usize,
}

impl Transport {
    /// Validate `config` and build the shared HTTP client.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let base_url = validate_config(config)?;

        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            ConfigError::ValidationError(format!("failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            chunk_size: config.upload_chunk_size,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a call.
    pub fn url_for(&self, call: &Call) -> String {
        format!("{}{}", self.base_url, call.path_and_query())
    }

    /// GET `path`, interpreting the response as `kind`.
    pub async fn get(&self, path: &str, kind: ResponseKind) -> Result<MatchResult, ApiError> {
        self.send(Call::get(path).returns(kind), None).await
    }

    /// POST `body` to `path`.
    pub async fn post(
        &self,
        path: &str,
        body: RequestBody,
        kind: ResponseKind,
        progress: Option<&ProgressReporter>,
    ) -> Result<MatchResult, ApiError> {
        let mut call = Call::post(path).returns(kind);
        call.body = body;
        self.send(call, progress).await
    }

    /// PUT `body` to `path`.
    pub async fn put(
        &self,
        path: &str,
        body: RequestBody,
        kind: ResponseKind,
        progress: Option<&ProgressReporter>,
    ) -> Result<MatchResult, ApiError> {
        let mut call = Call::put(path).returns(kind);
        call.body = body;
        self.send(call, progress).await
    }

    /// Send a shaped call and interpret the response as the call declares.
    ///
    /// Progress events, if a reporter is given, are only emitted while the
    /// request body is being transmitted and never after this returns.
    pub async fn send(
        &self,
        call: Call,
        progress: Option<&ProgressReporter>,
    ) -> Result<MatchResult, ApiError> {
        let url = self.url_for(&call);
        let scope = progress.map(ProgressReporter::scoped);
        let total = call.body.multipart_len();

        debug!("{} {} ({:?} body)", call.method, url, call.body.field_names());

        let mut request = self.client.request(call.method, &url);
        request = match call.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => match &scope {
                Some(reporter) => {
                    let bytes =
                        Bytes::from(serde_json::to_vec(&value).map_err(ApiError::Encode)?);
                    let len = bytes.len() as u64;
                    request
                        .header(CONTENT_TYPE, "application/json")
                        .header(CONTENT_LENGTH, len)
                        .body(progress_body(bytes, self.chunk_size, 0, len, reporter.clone()))
                }
                None => request.json(&value),
            },
            RequestBody::Multipart(files) => {
                request.multipart(self.form(files, total, scope.as_ref())?)
            }
        };

        let result = request.send().await;
        if let Some(reporter) = &scope {
            reporter.close();
        }
        let response = result?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        interpret(response, call.response).await
    }

    fn form(
        &self,
        files: Vec<(&'static str, ImageUpload)>,
        total: u64,
        progress: Option<&ProgressReporter>,
    ) -> Result<multipart::Form, ApiError> {
        let mut form = multipart::Form::new();
        let mut offset = 0u64;

        for (field, upload) in files {
            let len = upload.len() as u64;
            let part = match progress {
                Some(reporter) => multipart::Part::stream_with_length(
                    progress_body(upload.bytes(), self.chunk_size, offset, total, reporter.clone()),
                    len,
                ),
                None => multipart::Part::stream_with_length(upload.bytes(), len),
            };
            let part = part
                .file_name(upload.file_name().to_string())
                .mime_str(upload.mime())
                .map_err(|e| {
                    ApiError::InvalidPayload(format!("bad MIME type '{}': {}", upload.mime(), e))
                })?;
            form = form.part(field, part);
            offset += len;
        }

        Ok(form)
    }
}

async fn interpret(response: Response, kind: ResponseKind) -> Result<MatchResult, ApiError> {
    match kind {
        ResponseKind::Binary => {
            let status = response.status();
            let headers = response.headers().clone();
            let url: Url = response.url().clone();
            let body = response.bytes().await?.to_vec();
            Ok(MatchResult::Binary(BinaryResponse {
                status,
                headers,
                url,
                body,
            }))
        }
        ResponseKind::Json => {
            if let Some(content_type) = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
            {
                if !is_json_content_type(content_type) {
                    return Err(ApiError::UnexpectedContentType {
                        expected: ResponseKind::Json.as_str(),
                        content_type: content_type.to_string(),
                    });
                }
            }
            let body = response.bytes().await?;
            if body.is_empty() {
                return Ok(MatchResult::Structured(Value::Null));
            }
            Ok(MatchResult::Structured(serde_json::from_slice(&body)?))
        }
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json_content_type() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("Application/JSON"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("image/jpeg"));
        assert!(!is_json_content_type("text/html"));
    }

    #[test]
    fn test_new_requires_base_url() {
        let err = Transport::new(&Config::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl));
    }

    #[test]
    fn test_url_for_keeps_base_path_prefix() {
        let transport = Transport::new(&Config::with_base_url("https://topo.example.org/api/")).unwrap();
        assert_eq!(transport.base_url(), "https://topo.example.org/api");

        let call = Call::post("/find_match").query("folder_path", "jura");
        assert_eq!(
            transport.url_for(&call),
            "https://topo.example.org/api/find_match?folder_path=jura"
        );
    }

    #[test]
    fn test_url_for_bare_host() {
        let transport = Transport::new(&Config::with_base_url("http://127.0.0.1:8000")).unwrap();
        assert_eq!(
            transport.url_for(&Call::get("/region/jura")),
            "http://127.0.0.1:8000/region/jura"
        );
    }
}
