//! Shared domain types.

/// Reference to one stored asset, sufficient to build its servable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub category: String,
    pub filename: String,
}

impl AssetRef {
    pub fn new(category: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            filename: filename.into(),
        }
    }

    /// Path the media handler serves this asset under.
    pub fn url(&self) -> String {
        format!("/img/{}/{}", self.category, self.filename)
    }
}
