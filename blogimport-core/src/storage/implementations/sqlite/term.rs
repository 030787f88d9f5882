//! SQLite implementation of TermStore

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};

use super::SqliteStore;
use crate::storage::helper::unix_timestamp;
use crate::storage::ids::TermId;
use crate::storage::traits::TermStore;
use crate::storage::types::{NewTerm, StoredTerm, TermUpsert};

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS terms (
            id TEXT PRIMARY KEY,
            taxonomy TEXT NOT NULL,
            label TEXT NOT NULL,
            slug TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(taxonomy, slug)
        );

        CREATE TABLE IF NOT EXISTS term_meta (
            term_id TEXT NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
            meta_key TEXT NOT NULL,
            meta_value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_term_meta_lookup ON term_meta(meta_key, meta_value);
        "#,
    )?;
    Ok(())
}

fn row_to_term(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredTerm> {
    Ok(StoredTerm {
        id: row.get(0)?,
        term: NewTerm {
            taxonomy: row.get(1)?,
            label: row.get(2)?,
            slug: row.get(3)?,
        },
        created_at: row.get(4)?,
    })
}

#[async_trait]
impl TermStore for SqliteStore {
    async fn create_or_get_term(&self, term: NewTerm) -> Result<TermUpsert> {
        let conn = self.conn()?;
        let existing: Option<TermId> = conn
            .query_row(
                "SELECT id FROM terms WHERE taxonomy = ?1 AND slug = ?2",
                params![term.taxonomy, term.slug],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(TermUpsert { id, created: false });
        }

        let id = TermId::new();
        conn.execute(
            "INSERT INTO terms (id, taxonomy, label, slug, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, term.taxonomy, term.label, term.slug, unix_timestamp()],
        )?;
        Ok(TermUpsert { id, created: true })
    }

    async fn get_term(&self, id: &TermId) -> Result<Option<StoredTerm>> {
        let conn = self.conn()?;
        let term = conn
            .query_row(
                "SELECT id, taxonomy, label, slug, created_at FROM terms WHERE id = ?1",
                params![id],
                row_to_term,
            )
            .optional()?;
        Ok(term)
    }

    async fn add_term_meta(&self, id: &TermId, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO term_meta (term_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
            params![id, key, value],
        )?;
        Ok(())
    }

    async fn find_terms_by_meta(&self, taxonomy: &str, key: &str, value: &str) -> Result<Vec<TermId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT t.id FROM terms t
             JOIN term_meta m ON m.term_id = t.id
             WHERE t.taxonomy = ?1 AND m.meta_key = ?2 AND m.meta_value = ?3
             ORDER BY t.created_at, t.rowid",
        )?;
        let ids = stmt
            .query_map(params![taxonomy, key, value], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<TermId>>>()?;
        Ok(ids)
    }

    async fn list_terms(&self, taxonomy: &str) -> Result<Vec<StoredTerm>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, taxonomy, label, slug, created_at FROM terms
             WHERE taxonomy = ?1 ORDER BY created_at, rowid",
        )?;
        let terms = stmt
            .query_map(params![taxonomy], row_to_term)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(terms)
    }
}
