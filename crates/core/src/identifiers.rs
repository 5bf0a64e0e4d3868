//! Region, crag and folder identifiers.
//!
//! The matching service addresses its corpus as `region/crag` folders. These
//! types reject malformed names at the boundary so no request is ever built
//! around an empty segment, a traversal component or an embedded separator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::transport::ApiError;

const MAX_SEGMENT_LEN: usize = 255;

/// A single, path-segment-safe name (a region or a crag).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Result<Self, ApiError> {
        let value = value.into();
        check_segment(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Percent-encoded form for use inside a URL path.
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

fn check_segment(value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::InvalidIdentifier(
            "identifier cannot be empty".to_string(),
        ));
    }
    if value.len() > MAX_SEGMENT_LEN {
        return Err(ApiError::InvalidIdentifier(format!(
            "identifier longer than {} bytes",
            MAX_SEGMENT_LEN
        )));
    }
    if value == "." || value == ".." {
        return Err(ApiError::InvalidIdentifier(format!(
            "'{}' is not a valid identifier",
            value
        )));
    }
    if let Some(c) = value
        .chars()
        .find(|c| *c == '/' || *c == '\\' || c.is_control())
    {
        return Err(ApiError::InvalidIdentifier(format!(
            "'{}' contains forbidden character {:?}",
            value, c
        )));
    }
    Ok(())
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// A corpus scope: one or more identifiers joined by `/` (e.g. `region-a/crag-b`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderPath {
    segments: Vec<Identifier>,
}

impl FolderPath {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        let segments = value
            .split('/')
            .map(Identifier::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| match e {
                ApiError::InvalidIdentifier(msg) => {
                    ApiError::InvalidIdentifier(format!("folder path '{}': {}", value, msg))
                }
                other => other,
            })?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Identifier] {
        &self.segments
    }

    /// Append a child segment, e.g. a crag below its region.
    pub fn join(&self, child: &Identifier) -> Self {
        let mut segments = self.segments.clone();
        segments.push(child.clone());
        Self { segments }
    }

    /// Each segment percent-encoded, `/` separators kept literal.
    pub fn encoded(&self) -> String {
        self.segments
            .iter()
            .map(Identifier::encoded)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for FolderPath {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Identifier> for FolderPath {
    fn from(id: Identifier) -> Self {
        Self { segments: vec![id] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_accepts_plain_names() {
        for name in ["jura", "region-a", "crag_b", "Sokoliki 2", "łysa.skała"] {
            assert_eq!(Identifier::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_identifier_rejects_malformed() {
        for bad in ["", ".", "..", "a/b", "a\\b", "tab\there", "nl\n"] {
            assert!(
                matches!(Identifier::new(bad), Err(ApiError::InvalidIdentifier(_))),
                "expected '{}' to be rejected",
                bad.escape_debug()
            );
        }
        assert!(Identifier::new("x".repeat(256)).is_err());
        assert!(Identifier::new("x".repeat(255)).is_ok());
    }

    #[test]
    fn test_identifier_encoded() {
        let id = Identifier::new("crag #1").unwrap();
        assert_eq!(id.encoded(), "crag%20%231");
    }

    #[test]
    fn test_identifier_serde_validates() {
        let id: Identifier = serde_json::from_str("\"jura\"").unwrap();
        assert_eq!(id.as_str(), "jura");
        assert!(serde_json::from_str::<Identifier>("\"a/b\"").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"jura\"");
    }

    #[test]
    fn test_folder_path_parse_and_display() {
        let path = FolderPath::parse("region-a/crag-b").unwrap();
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.to_string(), "region-a/crag-b");
        assert_eq!(path.encoded(), "region-a/crag-b");
    }

    #[test]
    fn test_folder_path_encodes_each_segment() {
        let path = FolderPath::parse("region a/crag#1").unwrap();
        assert_eq!(path.encoded(), "region%20a/crag%231");
    }

    #[test]
    fn test_folder_path_rejects_empty_segments() {
        for bad in ["", "/", "a//b", "/a", "a/", "a/../b"] {
            assert!(FolderPath::parse(bad).is_err(), "expected '{}' rejected", bad);
        }
    }

    #[test]
    fn test_folder_path_join() {
        let region: FolderPath = Identifier::new("jura").unwrap().into();
        let crag = Identifier::new("gora-zborow").unwrap();
        assert_eq!(region.join(&crag).to_string(), "jura/gora-zborow");
    }
}
