//! Mock matching service for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::identifiers::FolderPath;
use crate::matching::MatchingApi;
use crate::payload::{EncodedImage, ImageUpload};
use crate::transport::{ApiError, BinaryResponse, ProgressEvent, ProgressReporter};

/// A recorded matching call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedMatchCall {
    FindMatch { file_name: String, folder: String },
    FindMatchingMatrix { image_data: String, folder: String },
    BestMatchPreview { file_name: String, best_match: String },
    MatchingMatrix { file1: String, file2: String },
    MatchingEncoded { image1: String, image2: String },
}

/// Mock implementation of the MatchingApi trait.
///
/// Provides controllable behavior for testing:
/// - Return queued structured results (or `Value::Null` when the queue is empty)
/// - Return a configurable preview image
/// - Emit one complete progress event per upload
/// - Track calls for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use topomatch_core::testing::{MockMatchingApi, fixtures};
///
/// let api = MockMatchingApi::new();
/// api.push_result(fixtures::folder_match_body("./images/jura/a.jpg", 42)).await;
///
/// let body = api.find_match(&image, &folder, None).await?;
/// assert_eq!(body["score"], 42);
/// ```
#[derive(Debug)]
pub struct MockMatchingApi {
    results: Arc<RwLock<VecDeque<Value>>>,
    preview: Arc<RwLock<Vec<u8>>>,
    calls: Arc<RwLock<Vec<RecordedMatchCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ApiError>>>,
}

impl Default for MockMatchingApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMatchingApi {
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(VecDeque::new())),
            preview: Arc::new(RwLock::new(b"\xff\xd8\xff\xe0preview".to_vec())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Queue a structured result for the next JSON-returning call.
    pub async fn push_result(&self, value: Value) {
        self.results.write().await.push_back(value);
    }

    /// Bytes returned by `get_best_match_preview`.
    pub async fn set_preview(&self, bytes: Vec<u8>) {
        *self.preview.write().await = bytes;
    }

    /// Make the next operation fail.
    pub async fn fail_next(&self, error: ApiError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedMatchCall> {
        self.calls.read().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, call: RecordedMatchCall) -> Result<(), ApiError> {
        self.calls.write().await.push(call);
        match self.next_error.write().await.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn next_result(&self) -> Value {
        self.results.write().await.pop_front().unwrap_or(Value::Null)
    }
}

fn report_complete(progress: Option<&ProgressReporter>, len: usize) {
    if let Some(reporter) = progress {
        reporter.report(ProgressEvent {
            loaded: len as u64,
            total: Some(len as u64),
            bytes: len as u64,
        });
    }
}

#[async_trait]
impl MatchingApi for MockMatchingApi {
    async fn find_match(
        &self,
        image: &ImageUpload,
        folder: &FolderPath,
        progress: Option<&ProgressReporter>,
    ) -> Result<Value, ApiError> {
        self.record(RecordedMatchCall::FindMatch {
            file_name: image.file_name().to_string(),
            folder: folder.to_string(),
        })
        .await?;
        report_complete(progress, image.len());
        Ok(self.next_result().await)
    }

    async fn find_matching_matrix(
        &self,
        image: &EncodedImage,
        folder: &FolderPath,
        progress: Option<&ProgressReporter>,
    ) -> Result<Value, ApiError> {
        self.record(RecordedMatchCall::FindMatchingMatrix {
            image_data: image.as_str().to_string(),
            folder: folder.to_string(),
        })
        .await?;
        report_complete(progress, image.as_str().len());
        Ok(self.next_result().await)
    }

    async fn get_best_match_preview(
        &self,
        image: &ImageUpload,
        best_match: &str,
        progress: Option<&ProgressReporter>,
    ) -> Result<BinaryResponse, ApiError> {
        self.record(RecordedMatchCall::BestMatchPreview {
            file_name: image.file_name().to_string(),
            best_match: best_match.to_string(),
        })
        .await?;
        report_complete(progress, image.len());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
        let url = Url::parse("http://mock.invalid/get_matching_with")
            .map_err(|e| ApiError::InvalidPayload(e.to_string()))?;
        Ok(BinaryResponse {
            status: StatusCode::OK,
            headers,
            url,
            body: self.preview.read().await.clone(),
        })
    }

    async fn get_matching_matrix(
        &self,
        image1: &ImageUpload,
        image2: &ImageUpload,
    ) -> Result<Value, ApiError> {
        self.record(RecordedMatchCall::MatchingMatrix {
            file1: image1.file_name().to_string(),
            file2: image2.file_name().to_string(),
        })
        .await?;
        Ok(self.next_result().await)
    }

    async fn get_matching(
        &self,
        image1: &EncodedImage,
        image2: &EncodedImage,
    ) -> Result<Value, ApiError> {
        self.record(RecordedMatchCall::MatchingEncoded {
            image1: image1.as_str().to_string(),
            image2: image2.as_str().to_string(),
        })
        .await?;
        Ok(self.next_result().await)
    }
}
