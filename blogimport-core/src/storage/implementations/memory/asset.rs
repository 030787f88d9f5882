//! In-memory AssetStore implementation

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::{MemoryStore, lock};
use crate::storage::helper::unix_timestamp;
use crate::storage::ids::AssetId;
use crate::storage::traits::AssetStore;
use crate::storage::types::{NewAsset, StoredAsset};

#[async_trait]
impl AssetStore for MemoryStore {
    async fn register_asset(&self, asset: NewAsset) -> Result<AssetId> {
        let mut assets = lock(&self.assets)?;
        if assets.iter().any(|a| a.asset.filename == asset.filename) {
            bail!("asset filename already registered: {}", asset.filename);
        }
        let id = AssetId::new();
        assets.push(StoredAsset {
            id: id.clone(),
            asset,
            created_at: unix_timestamp(),
        });
        Ok(id)
    }

    async fn get_asset(&self, id: &AssetId) -> Result<Option<StoredAsset>> {
        let assets = lock(&self.assets)?;
        Ok(assets.iter().find(|a| &a.id == id).cloned())
    }

    async fn find_asset_by_filename(&self, filename: &str) -> Result<Option<StoredAsset>> {
        let assets = lock(&self.assets)?;
        Ok(assets.iter().find(|a| a.asset.filename == filename).cloned())
    }
}
