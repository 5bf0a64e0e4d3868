//! Image payloads for upload.

use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;

use crate::transport::ApiError;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Raw image content sent as a multipart file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    mime: String,
    data: Bytes,
}

impl ImageUpload {
    /// Build an upload from bytes; the MIME type is guessed from `file_name`.
    pub fn from_bytes(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for_file_name(&file_name).to_string();
        Self {
            file_name,
            mime,
            data: Bytes::from(data.into()),
        }
    }

    /// Read an image from disk.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            ApiError::InvalidPayload(format!("failed to read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::from_bytes(file_name, data))
    }

    /// Override the guessed MIME type.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The content as a shared buffer; no copy is made.
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Image content already encoded as a transportable string (data URI or bare base64).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(upload: &ImageUpload) -> Self {
        Self(format!(
            "data:{};base64,{}",
            upload.mime(),
            general_purpose::STANDARD.encode(upload.data())
        ))
    }

    /// Bare standard base64, no data URI prefix.
    pub fn base64(upload: &ImageUpload) -> Self {
        Self(general_purpose::STANDARD.encode(upload.data()))
    }

    /// Wrap a string produced elsewhere (e.g. a browser `FileReader`).
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn mime_for_file_name(file_name: &str) -> &'static str {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return FALLBACK_MIME,
    };
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => FALLBACK_MIME,
    }
}
