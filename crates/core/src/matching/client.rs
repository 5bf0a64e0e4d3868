//! HTTP client for the matching service.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{Config, ConfigError};
use crate::identifiers::FolderPath;
use crate::payload::{EncodedImage, ImageUpload};
use crate::transport::{
    relay, ApiError, BinaryResponse, MatchResult, ProgressReporter, Transport,
};

use super::requests;
use super::{MatchRequest, MatchingApi};

/// Client for the topo matching service.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TopomatchClient {
    transport: Transport,
}

impl TopomatchClient {
    /// Validate `config` and build a client bound to its base URL.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::from_transport(Transport::new(config)?))
    }

    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Search `folder` for the reference image best matching `image`.
    pub async fn find_match(
        &self,
        image: &ImageUpload,
        folder: &FolderPath,
        progress: Option<&ProgressReporter>,
    ) -> Result<Value, ApiError> {
        let call = requests::find_match(image, folder);
        let result = self.transport.send(call, progress).await;
        relay(
            "Error uploading file",
            result.and_then(MatchResult::into_structured),
        )
    }

    /// Score an encoded image against every reference in `folder`.
    pub async fn find_matching_matrix(
        &self,
        image: &EncodedImage,
        folder: &FolderPath,
        progress: Option<&ProgressReporter>,
    ) -> Result<Value, ApiError> {
        let call = requests::find_matching_matrix(image, folder);
        let result = self.transport.send(call, progress).await;
        relay(
            "Error finding matching matrix",
            result.and_then(MatchResult::into_structured),
        )
    }

    /// Render the correspondences between `image` and the already-chosen best match.
    ///
    /// The body is returned as bytes with its status and headers, never decoded.
    pub async fn get_best_match_preview(
        &self,
        image: &ImageUpload,
        best_match: &str,
        progress: Option<&ProgressReporter>,
    ) -> Result<BinaryResponse, ApiError> {
        let call = requests::best_match_preview(image, best_match)?;
        let result = self.transport.send(call, progress).await;
        relay(
            "Error fetching best match preview",
            result.and_then(MatchResult::into_binary),
        )
    }

    /// Compare two uploaded images directly.
    pub async fn get_matching_matrix(
        &self,
        image1: &ImageUpload,
        image2: &ImageUpload,
    ) -> Result<Value, ApiError> {
        let call = requests::matching_matrix(image1, image2);
        let result = self.transport.send(call, None).await;
        relay(
            "Error fetching matching matrix with files",
            result.and_then(MatchResult::into_structured),
        )
    }

    /// Compare two base64-encoded images directly.
    pub async fn get_matching(
        &self,
        image1: &EncodedImage,
        image2: &EncodedImage,
    ) -> Result<Value, ApiError> {
        let call = requests::matching_encoded(image1, image2);
        let result = self.transport.send(call, None).await;
        relay(
            "Error fetching matching with encoded images",
            result.and_then(MatchResult::into_structured),
        )
    }

    /// Download a corpus reference image (e.g. the `best_match` of a folder search).
    pub async fn get_reference_image(&self, path: &str) -> Result<BinaryResponse, ApiError> {
        let call = requests::reference_image(path)?;
        let result = self.transport.send(call, None).await;
        relay(
            "Error fetching reference image",
            result.and_then(MatchResult::into_binary),
        )
    }

    /// Run whichever mode `request` selects.
    pub async fn execute(
        &self,
        request: &MatchRequest,
        progress: Option<&ProgressReporter>,
    ) -> Result<MatchResult, ApiError> {
        let value = match request {
            MatchRequest::FolderSearch { image, folder } => {
                self.find_match(image, folder, progress).await?
            }
            MatchRequest::CorpusMatrix { image, folder } => {
                self.find_matching_matrix(image, folder, progress).await?
            }
            MatchRequest::PairwiseCompare { image1, image2 } => {
                self.get_matching_matrix(image1, image2).await?
            }
        };
        Ok(MatchResult::Structured(value))
    }
}

#[async_trait]
impl MatchingApi for TopomatchClient {
    async fn find_match(
        &self,
        image: &ImageUpload,
        folder: &FolderPath,
        progress: Option<&ProgressReporter>,
    ) -> Result<Value, ApiError> {
        TopomatchClient::find_match(self, image, folder, progress).await
    }

    async fn find_matching_matrix(
        &self,
        image: &EncodedImage,
        folder: &FolderPath,
        progress: Option<&ProgressReporter>,
    ) -> Result<Value, ApiError> {
        TopomatchClient::find_matching_matrix(self, image, folder, progress).await
    }

    async fn get_best_match_preview(
        &self,
        image: &ImageUpload,
        best_match: &str,
        progress: Option<&ProgressReporter>,
    ) -> Result<BinaryResponse, ApiError> {
        TopomatchClient::get_best_match_preview(self, image, best_match, progress).await
    }

    async fn get_matching_matrix(
        &self,
        image1: &ImageUpload,
        image2: &ImageUpload,
    ) -> Result<Value, ApiError> {
        TopomatchClient::get_matching_matrix(self, image1, image2).await
    }

    async fn get_matching(
        &self,
        image1: &EncodedImage,
        image2: &EncodedImage,
    ) -> Result<Value, ApiError> {
        TopomatchClient::get_matching(self, image1, image2).await
    }
}
