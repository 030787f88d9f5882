//! Asset types for storage

use crate::storage::ids::{AssetId, EntryId};

/// Asset metadata for storage (input form)
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    /// Derived filename; unique across the store
    pub filename: String,

    /// MIME type of the asset (e.g., "image/png")
    pub mime_type: String,

    /// Size in bytes
    pub size_bytes: i64,

    /// Path inside the upload directory
    pub local_path: String,

    /// Public URL the asset is served from
    pub url: String,

    /// Entry the asset was imported for
    pub owner: Option<EntryId>,

    /// Pixel dimensions, when the bytes decode as an image
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl NewAsset {
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: i64,
        local_path: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            size_bytes,
            local_path: local_path.into(),
            url: url.into(),
            owner: None,
            width: None,
            height: None,
        }
    }

    pub fn with_owner(mut self, owner: &EntryId) -> Self {
        self.owner = Some(owner.clone());
        self
    }

    pub fn with_dimensions(mut self, dimensions: Option<(u32, u32)>) -> Self {
        if let Some((width, height)) = dimensions {
            self.width = Some(width);
            self.height = Some(height);
        }
        self
    }
}

/// A stored asset with metadata from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAsset {
    pub id: AssetId,
    pub asset: NewAsset,
    /// When this asset was registered (unix timestamp ms)
    pub created_at: i64,
}

impl StoredAsset {
    pub fn filename(&self) -> &str {
        &self.asset.filename
    }

    pub fn url(&self) -> &str {
        &self.asset.url
    }

    pub fn mime_type(&self) -> &str {
        &self.asset.mime_type
    }

    pub fn owner(&self) -> Option<&EntryId> {
        self.asset.owner.as_ref()
    }
}
