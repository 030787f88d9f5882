//! AssetStore trait for asset metadata storage

use anyhow::Result;
use async_trait::async_trait;

use crate::storage::ids::AssetId;
use crate::storage::types::asset::{NewAsset, StoredAsset};

/// Trait for asset storage operations
///
/// The file bytes live in an `UploadDir`; this trait manages the records.
/// Filenames are unique: registering a filename twice fails.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Register an asset record and return its generated id
    async fn register_asset(&self, asset: NewAsset) -> Result<AssetId>;

    async fn get_asset(&self, id: &AssetId) -> Result<Option<StoredAsset>>;

    /// Look up an asset by its derived filename
    async fn find_asset_by_filename(&self, filename: &str) -> Result<Option<StoredAsset>>;
}
