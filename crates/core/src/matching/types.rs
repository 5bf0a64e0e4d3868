//! Typed views over the matching service's JSON responses.
//!
//! Operations return the body exactly as received; these types are an
//! opt-in, lossless reading of it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::FolderPath;
use crate::payload::{EncodedImage, ImageUpload};
use crate::transport::ApiError;

/// One matching request. Exactly one mode per call.
#[derive(Debug, Clone)]
pub enum MatchRequest {
    /// Best match for one image within a corpus folder.
    FolderSearch {
        image: ImageUpload,
        folder: FolderPath,
    },
    /// Full matrix of one encoded image against a corpus folder.
    CorpusMatrix {
        image: EncodedImage,
        folder: FolderPath,
    },
    /// Direct comparison of two images.
    PairwiseCompare {
        image1: ImageUpload,
        image2: ImageUpload,
    },
}

impl MatchRequest {
    pub fn mode(&self) -> &'static str {
        match self {
            MatchRequest::FolderSearch { .. } => "folder_search",
            MatchRequest::CorpusMatrix { .. } => "corpus_matrix",
            MatchRequest::PairwiseCompare { .. } => "pairwise_compare",
        }
    }
}

/// Result of a folder search: best match plus every candidate's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderMatch {
    pub best_match: String,
    pub score: i64,
    #[serde(default)]
    pub all_scores: BTreeMap<String, i64>,
}

impl FolderMatch {
    /// Candidates by descending score, ties broken by path.
    pub fn ranked(&self) -> Vec<(&str, i64)> {
        let mut ranked: Vec<(&str, i64)> = self
            .all_scores
            .iter()
            .map(|(path, score)| (path.as_str(), *score))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One inlier correspondence: `point1` in the query image, `point2` in the reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchedPoint {
    pub point1: Point,
    pub point2: Point,
}

/// Dimensions of an image as the matcher resized it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedImage {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_height: Option<u32>,
    /// Corpus path of the reference image (corpus matrix only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Matching matrix for a corpus search or a pairwise comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingMatrix {
    pub matched_points: Vec<MatchedPoint>,
    pub image1: MatchedImage,
    pub image2: MatchedImage,
    /// Annotations stored next to the best-matching reference (corpus matrix only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_match_json_content: Option<Value>,
    pub homography_matrix: Vec<f64>,
    pub homography_matrix_inverse: Vec<f64>,
}

impl MatchingMatrix {
    pub fn inlier_count(&self) -> usize {
        self.matched_points.len()
    }

    /// Homography as a row-major 3x3 matrix, if the server sent nine values.
    pub fn homography(&self) -> Option<[[f64; 3]; 3]> {
        to_3x3(&self.homography_matrix)
    }

    pub fn homography_inverse(&self) -> Option<[[f64; 3]; 3]> {
        to_3x3(&self.homography_matrix_inverse)
    }
}

fn to_3x3(values: &[f64]) -> Option<[[f64; 3]; 3]> {
    if values.len() != 9 {
        return None;
    }
    Some([
        [values[0], values[1], values[2]],
        [values[3], values[4], values[5]],
        [values[6], values[7], values[8]],
    ])
}

impl TryFrom<Value> for FolderMatch {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(serde_json::from_value(value)?)
    }
}

impl TryFrom<Value> for MatchingMatrix {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(serde_json::from_value(value)?)
    }
}
