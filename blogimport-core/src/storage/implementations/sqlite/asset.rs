//! SQLite implementation of AssetStore

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};

use super::SqliteStore;
use crate::storage::helper::unix_timestamp;
use crate::storage::ids::AssetId;
use crate::storage::traits::AssetStore;
use crate::storage::types::{NewAsset, StoredAsset};

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL UNIQUE,
            mime_type TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            local_path TEXT NOT NULL,
            url TEXT NOT NULL,
            owner_id TEXT,
            width INTEGER,
            height INTEGER,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_assets_owner ON assets(owner_id);
        "#,
    )?;
    Ok(())
}

const SELECT_ASSET: &str = "SELECT id, filename, mime_type, size_bytes, local_path, url, owner_id, width, height, created_at FROM assets";

fn row_to_asset(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredAsset> {
    Ok(StoredAsset {
        id: row.get(0)?,
        asset: NewAsset {
            filename: row.get(1)?,
            mime_type: row.get(2)?,
            size_bytes: row.get(3)?,
            local_path: row.get(4)?,
            url: row.get(5)?,
            owner: row.get(6)?,
            width: row.get(7)?,
            height: row.get(8)?,
        },
        created_at: row.get(9)?,
    })
}

#[async_trait]
impl AssetStore for SqliteStore {
    async fn register_asset(&self, asset: NewAsset) -> Result<AssetId> {
        let conn = self.conn()?;
        let id = AssetId::new();
        conn.execute(
            "INSERT INTO assets (id, filename, mime_type, size_bytes, local_path, url, owner_id, width, height, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                asset.filename,
                asset.mime_type,
                asset.size_bytes,
                asset.local_path,
                asset.url,
                asset.owner,
                asset.width,
                asset.height,
                unix_timestamp()
            ],
        )?;
        Ok(id)
    }

    async fn get_asset(&self, id: &AssetId) -> Result<Option<StoredAsset>> {
        let conn = self.conn()?;
        let asset = conn
            .query_row(&format!("{SELECT_ASSET} WHERE id = ?1"), params![id], row_to_asset)
            .optional()?;
        Ok(asset)
    }

    async fn find_asset_by_filename(&self, filename: &str) -> Result<Option<StoredAsset>> {
        let conn = self.conn()?;
        let asset = conn
            .query_row(
                &format!("{SELECT_ASSET} WHERE filename = ?1"),
                params![filename],
                row_to_asset,
            )
            .optional()?;
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ids::EntryId;

    #[tokio::test]
    async fn test_register_and_get() {
        let store = SqliteStore::in_memory().unwrap();
        let owner = EntryId::from_string("entry-1");
        let asset = NewAsset::new("abc.jpg", "image/jpeg", 2048, "/up/abc.jpg", "http://local/abc.jpg")
            .with_owner(&owner)
            .with_dimensions(Some((640, 480)));

        let id = store.register_asset(asset.clone()).await.unwrap();
        let stored = store.get_asset(&id).await.unwrap().unwrap();
        assert_eq!(stored.asset, asset);

        let found = store.find_asset_by_filename("abc.jpg").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert!(store.find_asset_by_filename("nope.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filename_is_unique() {
        let store = SqliteStore::in_memory().unwrap();
        let asset = NewAsset::new("a.png", "image/png", 1, "a.png", "u");
        store.register_asset(asset.clone()).await.unwrap();
        assert!(store.register_asset(asset).await.is_err());
    }
}
