use crate::core::analytics::CompressionResult;
use crate::core::encoder::ImageEncoder;
use crate::core::storage::ArtifactStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub encoder: Arc<dyn ImageEncoder>,
    pub store: Arc<dyn ArtifactStore>,
    pub max_image_bytes: usize,
}

impl AppState {
    pub fn new(
        encoder: Arc<dyn ImageEncoder>,
        store: Arc<dyn ArtifactStore>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            encoder,
            store,
            max_image_bytes,
        }
    }
}

// Response structure
#[derive(Serialize, Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompressResponse {
    pub success: bool,
    pub compressed_image_url: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
    pub quality: u8,
}

impl From<CompressionResult> for CompressResponse {
    fn from(result: CompressionResult) -> Self {
        Self {
            success: true,
            compressed_image_url: result.artifact_url,
            original_size: result.original_size,
            compressed_size: result.compressed_size,
            compression_ratio: result.compression_ratio,
            quality: result.quality,
        }
    }
}

/// Error body. Client errors carry only `message`, server errors add
/// `success: false`.
#[derive(Serialize, Debug, Deserialize, Clone, PartialEq)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub message: String,
}
