//! SQLite storage backend
//!
//! Provides `SqliteStore` - a shared SQLite connection wrapper that
//! implements every store trait the importer needs.
//!
//! Trait implementations are in submodules:
//! - `entry` - EntryStore impl (entries, entry meta, term links, tags)
//! - `term` - TermStore impl (terms, term meta)
//! - `asset` - AssetStore impl

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

mod asset;
mod entry;
mod term;

pub(crate) use asset::init_schema as init_asset_schema;
pub(crate) use entry::init_schema as init_entry_schema;
pub(crate) use term::init_schema as init_term_schema;

/// Shared SQLite connection
///
/// Create one store and share it via `Arc` across the importer and the
/// asset importer.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(&path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite database (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("sqlite connection lock poisoned"))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_term_schema(&conn)?;
        init_entry_schema(&conn)?;
        init_asset_schema(&conn)?;
        Ok(())
    }
}
