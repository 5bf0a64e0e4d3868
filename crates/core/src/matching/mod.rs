//! Matching operations against the topo matching service.
//!
//! Four modes share one transport: folder search, corpus matrix, best-match
//! preview and pairwise comparison (from files or from encoded strings).

mod client;
pub mod requests;
mod types;

pub use client::TopomatchClient;
pub use types::*;

use async_trait::async_trait;
use serde_json::Value;

use crate::identifiers::FolderPath;
use crate::payload::{EncodedImage, ImageUpload};
use crate::transport::{ApiError, BinaryResponse, ProgressReporter};

/// The matching operations, as seen by a caller.
///
/// Implemented by [`TopomatchClient`] and by the in-memory mock in
/// `testing`. Every implementation returns errors unchanged.
#[async_trait]
pub trait MatchingApi: Send + Sync {
    /// Best match for `image` within `folder`.
    async fn find_match(
        &self,
        image: &ImageUpload,
        folder: &FolderPath,
        progress: Option<&ProgressReporter>,
    ) -> Result<Value, ApiError>;

    /// Matching matrix of an encoded image against `folder`.
    async fn find_matching_matrix(
        &self,
        image: &EncodedImage,
        folder: &FolderPath,
        progress: Option<&ProgressReporter>,
    ) -> Result<Value, ApiError>;

    /// Binary preview of `image` matched against `best_match`.
    async fn get_best_match_preview(
        &self,
        image: &ImageUpload,
        best_match: &str,
        progress: Option<&ProgressReporter>,
    ) -> Result<BinaryResponse, ApiError>;

    /// Direct comparison of two uploaded images.
    async fn get_matching_matrix(
        &self,
        image1: &ImageUpload,
        image2: &ImageUpload,
    ) -> Result<Value, ApiError>;

    /// Direct comparison of two encoded images.
    async fn get_matching(
        &self,
        image1: &EncodedImage,
        image2: &EncodedImage,
    ) -> Result<Value, ApiError>;
}
