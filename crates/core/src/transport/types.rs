use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;

use crate::payload::ImageUpload;

use super::ApiError;

/// How a call's response body is to be interpreted. Declared per call, never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    #[default]
    Json,
    /// Opaque bytes; returned with status and headers, never parsed.
    Binary,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Json => "application/json",
            ResponseKind::Binary => "binary",
        }
    }
}

/// Request payload. One shape per call; shapes never mix.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Files keyed by multipart field name, in order.
    Multipart(Vec<(&'static str, ImageUpload)>),
}

impl RequestBody {
    /// Multipart field names in order (empty for non-multipart bodies).
    pub fn field_names(&self) -> Vec<&'static str> {
        match self {
            RequestBody::Multipart(files) => files.iter().map(|(name, _)| *name).collect(),
            _ => Vec::new(),
        }
    }

    /// Total bytes of the files in a multipart body, framing excluded.
    pub(crate) fn multipart_len(&self) -> u64 {
        match self {
            RequestBody::Multipart(files) => files.iter().map(|(_, f)| f.len() as u64).sum(),
            _ => 0,
        }
    }
}

/// A fully shaped request: verb, path, query, payload and expected response kind.
///
/// Query values are stored already percent-encoded; how each parameter is
/// encoded is the request builder's decision.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: RequestBody,
    pub response: ResponseKind,
}

impl Call {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            response: ResponseKind::Json,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Add a query parameter whose value is already encoded.
    pub fn query(mut self, key: &'static str, encoded_value: impl Into<String>) -> Self {
        self.query.push((key, encoded_value.into()));
        self
    }

    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn file(mut self, field: &'static str, upload: &ImageUpload) -> Self {
        match &mut self.body {
            RequestBody::Multipart(files) => files.push((field, upload.clone())),
            _ => self.body = RequestBody::Multipart(vec![(field, upload.clone())]),
        }
        self
    }

    pub fn returns(mut self, kind: ResponseKind) -> Self {
        self.response = kind;
        self
    }

    /// Path plus query string, relative to the base URL.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

/// Binary response with the metadata needed to render it.
#[derive(Debug, Clone)]
pub struct BinaryResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
    pub body: Vec<u8>,
}

impl BinaryResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Outcome of one call, tagged by the declared response kind.
#[derive(Debug, Clone)]
pub enum MatchResult {
    Structured(Value),
    Binary(BinaryResponse),
}

impl MatchResult {
    pub fn kind(&self) -> ResponseKind {
        match self {
            MatchResult::Structured(_) => ResponseKind::Json,
            MatchResult::Binary(_) => ResponseKind::Binary,
        }
    }

    pub fn into_structured(self) -> Result<Value, ApiError> {
        match self {
            MatchResult::Structured(value) => Ok(value),
            MatchResult::Binary(binary) => Err(ApiError::UnexpectedContentType {
                expected: ResponseKind::Json.as_str(),
                content_type: binary
                    .content_type()
                    .unwrap_or(ResponseKind::Binary.as_str())
                    .to_string(),
            }),
        }
    }

    pub fn into_binary(self) -> Result<BinaryResponse, ApiError> {
        match self {
            MatchResult::Binary(binary) => Ok(binary),
            MatchResult::Structured(_) => Err(ApiError::UnexpectedContentType {
                expected: ResponseKind::Binary.as_str(),
                content_type: ResponseKind::Json.as_str().to_string(),
            }),
        }
    }
}
