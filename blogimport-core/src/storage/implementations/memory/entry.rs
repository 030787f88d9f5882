//! In-memory EntryStore implementation

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::{EntryRecord, MemoryStore, lock};
use crate::storage::helper::{dedup_preserving_order, unix_timestamp};
use crate::storage::ids::{AssetId, EntryId, TermId};
use crate::storage::traits::EntryStore;
use crate::storage::types::{NewEntry, StoredEntry};

fn find<'a>(
    entries: &'a mut [(EntryId, EntryRecord)],
    id: &EntryId,
) -> Result<&'a mut EntryRecord> {
    entries
        .iter_mut()
        .find(|(eid, _)| eid == id)
        .map(|(_, record)| record)
        .ok_or_else(|| anyhow!("entry not found: {}", id))
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn create_entry(&self, entry: NewEntry) -> Result<EntryId> {
        let id = EntryId::new();
        let now = unix_timestamp();
        let record = EntryRecord {
            stored: Some(StoredEntry {
                id: id.clone(),
                entry,
                primary_image: None,
                created_at: now,
                updated_at: now,
            }),
            ..Default::default()
        };
        lock(&self.entries)?.push((id.clone(), record));
        Ok(id)
    }

    async fn get_entry(&self, id: &EntryId) -> Result<Option<StoredEntry>> {
        let entries = lock(&self.entries)?;
        Ok(entries
            .iter()
            .find(|(eid, _)| eid == id)
            .and_then(|(_, record)| record.stored.clone()))
    }

    async fn update_entry_content(&self, id: &EntryId, content: &str) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        let record = find(&mut entries, id)?;
        if let Some(stored) = record.stored.as_mut() {
            stored.entry.content = content.to_string();
            stored.updated_at = unix_timestamp();
        }
        Ok(())
    }

    async fn add_entry_meta(&self, id: &EntryId, key: &str, value: &str) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        find(&mut entries, id)?
            .meta
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn get_entry_meta(&self, id: &EntryId, key: &str) -> Result<Vec<String>> {
        let entries = lock(&self.entries)?;
        Ok(entries
            .iter()
            .find(|(eid, _)| eid == id)
            .map(|(_, record)| {
                record
                    .meta
                    .iter()
                    .filter(|(k, _)| k == key)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_entries_by_meta(&self, key: &str, value: &str) -> Result<Vec<EntryId>> {
        let entries = lock(&self.entries)?;
        Ok(entries
            .iter()
            .filter(|(_, record)| record.meta.iter().any(|(k, v)| k == key && v == value))
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn set_entry_terms(&self, id: &EntryId, taxonomy: &str, terms: &[TermId]) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        find(&mut entries, id)?
            .terms
            .insert(taxonomy.to_string(), dedup_preserving_order(terms));
        Ok(())
    }

    async fn get_entry_terms(&self, id: &EntryId, taxonomy: &str) -> Result<Vec<TermId>> {
        let entries = lock(&self.entries)?;
        Ok(entries
            .iter()
            .find(|(eid, _)| eid == id)
            .and_then(|(_, record)| record.terms.get(taxonomy).cloned())
            .unwrap_or_default())
    }

    async fn set_entry_tags(&self, id: &EntryId, labels: &[String]) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        find(&mut entries, id)?.tags = dedup_preserving_order(labels);
        Ok(())
    }

    async fn get_entry_tags(&self, id: &EntryId) -> Result<Vec<String>> {
        let entries = lock(&self.entries)?;
        Ok(entries
            .iter()
            .find(|(eid, _)| eid == id)
            .map(|(_, record)| record.tags.clone())
            .unwrap_or_default())
    }

    async fn set_primary_image(&self, id: &EntryId, asset: &AssetId) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        let record = find(&mut entries, id)?;
        if let Some(stored) = record.stored.as_mut() {
            stored.primary_image = Some(asset.clone());
            stored.updated_at = unix_timestamp();
        }
        Ok(())
    }
}
