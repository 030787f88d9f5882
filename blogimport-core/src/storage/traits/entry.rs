//! EntryStore trait for content entries

use anyhow::Result;
use async_trait::async_trait;

use crate::storage::ids::{AssetId, EntryId, TermId};
use crate::storage::types::entry::{NewEntry, StoredEntry};

/// Trait for content entry storage
///
/// Besides the entry itself this covers the side tables an import writes:
/// key/value metadata, term links, free-form tags and the primary image.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn create_entry(&self, entry: NewEntry) -> Result<EntryId>;

    async fn get_entry(&self, id: &EntryId) -> Result<Option<StoredEntry>>;

    /// Replace the HTML body of an entry
    async fn update_entry_content(&self, id: &EntryId, content: &str) -> Result<()>;

    /// Append a metadata value. Keys may repeat.
    async fn add_entry_meta(&self, id: &EntryId, key: &str, value: &str) -> Result<()>;

    /// All values recorded under `key`, in insertion order
    async fn get_entry_meta(&self, id: &EntryId, key: &str) -> Result<Vec<String>>;

    /// Entries carrying `key = value`, oldest first
    async fn find_entries_by_meta(&self, key: &str, value: &str) -> Result<Vec<EntryId>>;

    /// Replace the set of terms linked in `taxonomy`
    async fn set_entry_terms(&self, id: &EntryId, taxonomy: &str, terms: &[TermId]) -> Result<()>;

    async fn get_entry_terms(&self, id: &EntryId, taxonomy: &str) -> Result<Vec<TermId>>;

    /// Replace the entry's tags with `labels`
    async fn set_entry_tags(&self, id: &EntryId, labels: &[String]) -> Result<()>;

    async fn get_entry_tags(&self, id: &EntryId) -> Result<Vec<String>>;

    async fn set_primary_image(&self, id: &EntryId, asset: &AssetId) -> Result<()>;
}
