//! In-memory store
//!
//! `MemoryStore` implements every store trait over plain collections. It backs
//! the unit tests and the CLI's dry-run mode.

mod asset;
mod entry;
mod term;

use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::storage::ids::{EntryId, TermId};
use crate::storage::types::{StoredAsset, StoredEntry, StoredTerm};

#[derive(Debug, Default)]
struct EntryRecord {
    stored: Option<StoredEntry>,
    meta: Vec<(String, String)>,
    terms: HashMap<String, Vec<TermId>>,
    tags: Vec<String>,
}

#[derive(Debug, Default)]
struct TermRecord {
    stored: Option<StoredTerm>,
    meta: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    // insertion order is kept for deterministic lookups
    entries: Mutex<Vec<(EntryId, EntryRecord)>>,
    terms: Mutex<Vec<(TermId, TermRecord)>>,
    assets: Mutex<Vec<StoredAsset>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn term_count(&self) -> usize {
        self.terms.lock().map(|t| t.len()).unwrap_or(0)
    }

    pub fn asset_count(&self) -> usize {
        self.assets.lock().map(|a| a.len()).unwrap_or(0)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| anyhow!("memory store lock poisoned"))
}
