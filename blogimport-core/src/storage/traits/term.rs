//! TermStore trait for taxonomy terms

use anyhow::Result;
use async_trait::async_trait;

use crate::storage::ids::TermId;
use crate::storage::types::term::{NewTerm, StoredTerm, TermUpsert};

#[async_trait]
pub trait TermStore: Send + Sync {
    /// Create the term, or return the existing one with the same taxonomy and slug
    async fn create_or_get_term(&self, term: NewTerm) -> Result<TermUpsert>;

    async fn get_term(&self, id: &TermId) -> Result<Option<StoredTerm>>;

    async fn add_term_meta(&self, id: &TermId, key: &str, value: &str) -> Result<()>;

    /// Terms in `taxonomy` carrying `key = value`
    async fn find_terms_by_meta(&self, taxonomy: &str, key: &str, value: &str) -> Result<Vec<TermId>>;

    async fn list_terms(&self, taxonomy: &str) -> Result<Vec<StoredTerm>>;
}
