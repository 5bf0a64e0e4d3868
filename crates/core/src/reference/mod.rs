//! Region and crag reference data.
//!
//! Plain passthroughs to the service's `/region` and `/crag` resources. Bodies
//! go out and come back untouched; only the identifiers in the path are
//! checked.

mod types;

pub use types::*;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::identifiers::{FolderPath, Identifier};
use crate::matching::TopomatchClient;
use crate::transport::{relay, ApiError, Call, MatchResult};

pub fn get_region_call(region: &Identifier) -> Call {
    Call::get(format!("/region/{}", region.encoded()))
}

pub fn create_region_call(data: Value) -> Call {
    Call::post("/region").json(data)
}

pub fn get_crag_call(crag: &FolderPath) -> Call {
    Call::get(format!("/crag/{}", crag.encoded()))
}

pub fn update_crag_call(crag: &FolderPath, data: Value) -> Call {
    Call::put(format!("/crag/{}", crag.encoded())).json(data)
}

/// The region name travels in the path; the rest of the crag data is the body.
pub fn add_crag_call(region: &Identifier, data: Value) -> Call {
    Call::post(format!("/{}/crag", region.encoded())).json(data)
}

impl TopomatchClient {
    pub async fn get_region(&self, region: &Identifier) -> Result<Value, ApiError> {
        self.reference(get_region_call(region), "Error fetching region")
            .await
    }

    pub async fn create_region<T: Serialize + ?Sized + Sync>(
        &self,
        data: &T,
    ) -> Result<Value, ApiError> {
        match serde_json::to_value(data) {
            Ok(body) => {
                self.reference(create_region_call(body), "Error creating region")
                    .await
            }
            Err(e) => relay("Error creating region", Err(ApiError::Encode(e))),
        }
    }

    /// `crag` is either a bare crag name or a `region/crag` path.
    pub async fn get_crag(&self, crag: &FolderPath) -> Result<Value, ApiError> {
        self.reference(get_crag_call(crag), "Error fetching crag").await
    }

    pub async fn update_crag<T: Serialize + ?Sized + Sync>(
        &self,
        crag: &FolderPath,
        data: &T,
    ) -> Result<Value, ApiError> {
        match serde_json::to_value(data) {
            Ok(body) => {
                self.reference(update_crag_call(crag, body), "Error updating crag")
                    .await
            }
            Err(e) => relay("Error updating crag", Err(ApiError::Encode(e))),
        }
    }

    pub async fn add_crag<T: Serialize + ?Sized + Sync>(
        &self,
        region: &Identifier,
        data: &T,
    ) -> Result<Value, ApiError> {
        match serde_json::to_value(data) {
            Ok(body) => {
                self.reference(add_crag_call(region, body), "Error adding crag")
                    .await
            }
            Err(e) => relay("Error adding crag", Err(ApiError::Encode(e))),
        }
    }

    async fn reference(&self, call: Call, context: &'static str) -> Result<Value, ApiError> {
        let path = call.path.clone();
        let result = self
            .transport()
            .send(call, None)
            .await
            .and_then(MatchResult::into_structured);
        if let Ok(body) = &result {
            debug!("{} -> {}", path, body);
        }
        relay(context, result)
    }
}
