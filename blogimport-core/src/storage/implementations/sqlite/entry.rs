//! SQLite implementation of EntryStore

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::SqliteStore;
use crate::storage::helper::{dedup_preserving_order, unix_timestamp};
use crate::storage::ids::{AssetId, EntryId, TermId};
use crate::storage::traits::EntryStore;
use crate::storage::types::{EntryStatus, NewEntry, StoredEntry};

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY,
            entry_type TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            status TEXT NOT NULL,
            slug TEXT,
            published_at INTEGER,
            primary_image TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entry_meta (
            entry_id TEXT NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
            meta_key TEXT NOT NULL,
            meta_value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entry_terms (
            entry_id TEXT NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
            taxonomy TEXT NOT NULL,
            term_id TEXT NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            PRIMARY KEY (entry_id, term_id)
        );

        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            label TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS entry_tags (
            entry_id TEXT NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id),
            position INTEGER NOT NULL,
            PRIMARY KEY (entry_id, tag_id)
        );

        CREATE INDEX IF NOT EXISTS idx_entry_meta_lookup ON entry_meta(meta_key, meta_value);
        CREATE INDEX IF NOT EXISTS idx_entry_meta_entry ON entry_meta(entry_id);
        "#,
    )?;
    Ok(())
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredEntry> {
    let status: String = row.get(4)?;
    let published_at: Option<i64> = row.get(6)?;
    Ok(StoredEntry {
        id: row.get(0)?,
        entry: NewEntry {
            entry_type: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            status: EntryStatus::parse(&status).unwrap_or_default(),
            slug: row.get(5)?,
            published_at: published_at.and_then(DateTime::<Utc>::from_timestamp_millis),
        },
        primary_image: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn create_entry(&self, entry: NewEntry) -> Result<EntryId> {
        let conn = self.conn()?;
        let id = EntryId::new();
        let now = unix_timestamp();
        conn.execute(
            "INSERT INTO entries (id, entry_type, title, content, status, slug, published_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                id,
                entry.entry_type,
                entry.title,
                entry.content,
                entry.status.as_str(),
                entry.slug,
                entry.published_at.map(|d| d.timestamp_millis()),
                now
            ],
        )?;
        Ok(id)
    }

    async fn get_entry(&self, id: &EntryId) -> Result<Option<StoredEntry>> {
        let conn = self.conn()?;
        let entry = conn
            .query_row(
                "SELECT id, entry_type, title, content, status, slug, published_at, primary_image, created_at, updated_at
                 FROM entries WHERE id = ?1",
                params![id],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    async fn update_entry_content(&self, id: &EntryId, content: &str) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE entries SET content = ?1, updated_at = ?2 WHERE id = ?3",
            params![content, unix_timestamp(), id],
        )?;
        if updated == 0 {
            bail!("entry not found: {}", id);
        }
        Ok(())
    }

    async fn add_entry_meta(&self, id: &EntryId, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO entry_meta (entry_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
            params![id, key, value],
        )?;
        Ok(())
    }

    async fn get_entry_meta(&self, id: &EntryId, key: &str) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT meta_value FROM entry_meta WHERE entry_id = ?1 AND meta_key = ?2 ORDER BY rowid",
        )?;
        let values = stmt
            .query_map(params![id, key], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(values)
    }

    async fn find_entries_by_meta(&self, key: &str, value: &str) -> Result<Vec<EntryId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT e.id FROM entries e
             JOIN entry_meta m ON m.entry_id = e.id
             WHERE m.meta_key = ?1 AND m.meta_value = ?2
             ORDER BY e.created_at, e.rowid",
        )?;
        let ids = stmt
            .query_map(params![key, value], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<EntryId>>>()?;
        Ok(ids)
    }

    async fn set_entry_terms(&self, id: &EntryId, taxonomy: &str, terms: &[TermId]) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM entry_terms WHERE entry_id = ?1 AND taxonomy = ?2",
            params![id, taxonomy],
        )?;
        for (position, term) in dedup_preserving_order(terms).iter().enumerate() {
            tx.execute(
                "INSERT INTO entry_terms (entry_id, taxonomy, term_id, position) VALUES (?1, ?2, ?3, ?4)",
                params![id, taxonomy, term, position as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn get_entry_terms(&self, id: &EntryId, taxonomy: &str) -> Result<Vec<TermId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT term_id FROM entry_terms WHERE entry_id = ?1 AND taxonomy = ?2 ORDER BY position",
        )?;
        let ids = stmt
            .query_map(params![id, taxonomy], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<TermId>>>()?;
        Ok(ids)
    }

    async fn set_entry_tags(&self, id: &EntryId, labels: &[String]) -> Result<()> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM entry_tags WHERE entry_id = ?1", params![id])?;
        for (position, label) in dedup_preserving_order(labels).iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO tags (label) VALUES (?1)",
                params![label],
            )?;
            let tag_id: i64 =
                tx.query_row("SELECT id FROM tags WHERE label = ?1", params![label], |row| {
                    row.get(0)
                })?;
            tx.execute(
                "INSERT INTO entry_tags (entry_id, tag_id, position) VALUES (?1, ?2, ?3)",
                params![id, tag_id, position as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn get_entry_tags(&self, id: &EntryId) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT t.label FROM entry_tags et JOIN tags t ON t.id = et.tag_id
             WHERE et.entry_id = ?1 ORDER BY et.position",
        )?;
        let labels = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(labels)
    }

    async fn set_primary_image(&self, id: &EntryId, asset: &AssetId) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE entries SET primary_image = ?1, updated_at = ?2 WHERE id = ?3",
            params![asset, unix_timestamp(), id],
        )?;
        if updated == 0 {
            bail!("entry not found: {}", id);
        }
        Ok(())
    }
}
