use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::Identifier;

/// Body for `create_region`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRegion {
    pub region_name: Identifier,
    #[serde(default)]
    pub crags: Vec<Value>,
}

impl NewRegion {
    pub fn new(region_name: Identifier) -> Self {
        Self {
            region_name,
            crags: Vec::new(),
        }
    }
}

/// Body for `add_crag`: the crag's name and its reference topo as base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCrag {
    pub name: Identifier,
    pub image: String,
}

/// One reference image in a region listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceImage {
    pub path: String,
    pub name: String,
}

/// A crag's stored annotations and the path of its reference image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CragRecord {
    #[serde(default)]
    pub data: Option<Value>,
    pub image: String,
}
