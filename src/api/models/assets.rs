use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::registry::ResizePolicy;
use crate::types::AssetRef;

/// One category and its resize policy.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub name: String,
    /// Cover-fit target; absent means images are stored verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<ResizePolicy>,
}

/// One stored image, with the path it is served under.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImageResponse {
    pub category: String,
    pub filename: String,
    pub url: String,
}

impl From<AssetRef> for ImageResponse {
    fn from(asset: AssetRef) -> Self {
        let url = asset.url();
        Self {
            category: asset.category,
            filename: asset.filename,
            url,
        }
    }
}

/// JSON body the gallery page posts to delete an image.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteImageRequest {
    pub category: String,
    pub image: String,
}

/// Confirmation returned to the gallery page after a delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteImageResponse {
    pub message: String,
}
