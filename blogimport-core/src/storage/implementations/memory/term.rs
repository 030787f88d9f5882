//! In-memory TermStore implementation

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::{MemoryStore, TermRecord, lock};
use crate::storage::helper::unix_timestamp;
use crate::storage::ids::TermId;
use crate::storage::traits::TermStore;
use crate::storage::types::{NewTerm, StoredTerm, TermUpsert};

#[async_trait]
impl TermStore for MemoryStore {
    async fn create_or_get_term(&self, term: NewTerm) -> Result<TermUpsert> {
        let mut terms = lock(&self.terms)?;
        let existing = terms.iter().find(|(_, record)| {
            record
                .stored
                .as_ref()
                .is_some_and(|s| s.term.taxonomy == term.taxonomy && s.term.slug == term.slug)
        });
        if let Some((id, _)) = existing {
            return Ok(TermUpsert {
                id: id.clone(),
                created: false,
            });
        }

        let id = TermId::new();
        terms.push((
            id.clone(),
            TermRecord {
                stored: Some(StoredTerm {
                    id: id.clone(),
                    term,
                    created_at: unix_timestamp(),
                }),
                meta: Vec::new(),
            },
        ));
        Ok(TermUpsert { id, created: true })
    }

    async fn get_term(&self, id: &TermId) -> Result<Option<StoredTerm>> {
        let terms = lock(&self.terms)?;
        Ok(terms
            .iter()
            .find(|(tid, _)| tid == id)
            .and_then(|(_, record)| record.stored.clone()))
    }

    async fn add_term_meta(&self, id: &TermId, key: &str, value: &str) -> Result<()> {
        let mut terms = lock(&self.terms)?;
        let (_, record) = terms
            .iter_mut()
            .find(|(tid, _)| tid == id)
            .ok_or_else(|| anyhow!("term not found: {}", id))?;
        record.meta.push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn find_terms_by_meta(&self, taxonomy: &str, key: &str, value: &str) -> Result<Vec<TermId>> {
        let terms = lock(&self.terms)?;
        Ok(terms
            .iter()
            .filter(|(_, record)| {
                record.stored.as_ref().is_some_and(|s| s.term.taxonomy == taxonomy)
                    && record.meta.iter().any(|(k, v)| k == key && v == value)
            })
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn list_terms(&self, taxonomy: &str) -> Result<Vec<StoredTerm>> {
        let terms = lock(&self.terms)?;
        Ok(terms
            .iter()
            .filter_map(|(_, record)| record.stored.clone())
            .filter(|s| s.term.taxonomy == taxonomy)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_or_get_dedups_by_slug() {
        let store = MemoryStore::new();
        let first = store
            .create_or_get_term(NewTerm::new("category", "News", "news"))
            .await
            .unwrap();
        let second = store
            .create_or_get_term(NewTerm::new("category", "News (renamed)", "news"))
            .await
            .unwrap();
        let other_taxonomy = store
            .create_or_get_term(NewTerm::new("topic", "News", "news"))
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.id, second.id);
        assert!(other_taxonomy.created);
        assert_eq!(store.list_terms("category").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_term_meta_scoped_to_taxonomy() {
        let store = MemoryStore::new();
        let cat = store
            .create_or_get_term(NewTerm::new("category", "A", "a"))
            .await
            .unwrap();
        let topic = store
            .create_or_get_term(NewTerm::new("topic", "A", "a"))
            .await
            .unwrap();
        store.add_term_meta(&cat.id, "external_id", "c1").await.unwrap();
        store.add_term_meta(&topic.id, "external_id", "c1").await.unwrap();

        assert_eq!(
            store.find_terms_by_meta("category", "external_id", "c1").await.unwrap(),
            vec![cat.id]
        );
    }
}
