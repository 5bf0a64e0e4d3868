//! Request builders, one per matching mode.
//!
//! Each builder fixes its payload shape: FolderSearch and BestMatchPreview
//! carry their path context in the query string next to a multipart file,
//! CorpusMatrix carries everything in a JSON body, PairwiseCompare carries
//! two files and nothing else.

use serde_json::json;

use crate::identifiers::FolderPath;
use crate::payload::{EncodedImage, ImageUpload};
use crate::transport::{ApiError, Call, ResponseKind};

pub const FIELD_IMAGE1: &str = "image1";
pub const FIELD_IMAGE2: &str = "image2";

const IMAGES_PREFIX: &str = "images/";

/// POST `/find_match?folder_path=...` with `image1`.
///
/// Folder segments are encoded one by one so the `/` separators stay readable.
pub fn find_match(image: &ImageUpload, folder: &FolderPath) -> Call {
    Call::post("/find_match")
        .query("folder_path", folder.encoded())
        .file(FIELD_IMAGE1, image)
}

/// POST `/find_matching_matrix` with `{folder_path, image_data}`.
pub fn find_matching_matrix(image: &EncodedImage, folder: &FolderPath) -> Call {
    Call::post("/find_matching_matrix").json(json!({
        "folder_path": folder.to_string(),
        "image_data": image.as_str(),
    }))
}

/// POST `/get_matching_with?image_path=...` with `image1`; binary response.
///
/// The whole path is one query value, so `/` is encoded too.
pub fn best_match_preview(image: &ImageUpload, best_match: &str) -> Result<Call, ApiError> {
    if best_match.is_empty() {
        return Err(ApiError::InvalidIdentifier(
            "best match path cannot be empty".to_string(),
        ));
    }
    Ok(Call::post("/get_matching_with")
        .query("image_path", urlencoding::encode(best_match).into_owned())
        .file(FIELD_IMAGE1, image)
        .returns(ResponseKind::Binary))
}

/// POST `/get_matching_matrix` with `image1` and `image2`.
pub fn matching_matrix(image1: &ImageUpload, image2: &ImageUpload) -> Call {
    Call::post("/get_matching_matrix")
        .file(FIELD_IMAGE1, image1)
        .file(FIELD_IMAGE2, image2)
}

/// POST `/get_matching` with `{image1, image2}` as base64 strings.
pub fn matching_encoded(image1: &EncodedImage, image2: &EncodedImage) -> Call {
    Call::post("/get_matching").json(json!({
        "image1": image1.as_str(),
        "image2": image2.as_str(),
    }))
}

/// GET `/images/{path}`; binary response.
///
/// Accepts corpus paths as FolderSearch reports them (`./images/jura/x.jpg`)
/// as well as corpus-relative ones (`jura/x.jpg`).
pub fn reference_image(path: &str) -> Result<Call, ApiError> {
    let relative = path.trim_start_matches("./");
    let relative = relative.strip_prefix(IMAGES_PREFIX).unwrap_or(relative);
    let relative = FolderPath::parse(relative)?;
    Ok(Call::get(format!("/images/{}", relative.encoded())).returns(ResponseKind::Binary))
}
