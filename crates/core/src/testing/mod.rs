//! Testing utilities and mock implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use topomatch_core::testing::{fixtures, MockMatchingApi};
//!
//! let api = MockMatchingApi::new();
//! api.push_result(fixtures::folder_match_body("./images/jura/a.jpg", 42)).await;
//! ```

mod mock_matching;

pub use mock_matching::{MockMatchingApi, RecordedMatchCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::payload::ImageUpload;

    /// An upload of `len` bytes with a JPEG magic number.
    pub fn image(file_name: &str, len: usize) -> ImageUpload {
        let mut data = vec![0u8; len];
        for (dst, src) in data.iter_mut().zip([0xff, 0xd8, 0xff, 0xe0]) {
            *dst = src;
        }
        ImageUpload::from_bytes(file_name, data)
    }

    /// A folder search response as the matching service shapes it.
    pub fn folder_match_body(best_match: &str, score: i64) -> Value {
        json!({
            "best_match": best_match,
            "score": score,
            "all_scores": { best_match: score },
        })
    }

    /// A matching matrix response with `points` diagonal correspondences.
    pub fn matching_matrix_body(points: usize) -> Value {
        let matched_points: Vec<Value> = (0..points)
            .map(|i| {
                let v = i as f64;
                json!({"point1": {"x": v, "y": v}, "point2": {"x": v + 1.0, "y": v + 1.0}})
            })
            .collect();
        json!({
            "matched_points": matched_points,
            "image1": {"width": 840, "height": 630},
            "image2": {"width": 840, "height": 560},
            "homography_matrix": [1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0],
            "homography_matrix_inverse": [1.0, 0.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0],
        })
    }
}
