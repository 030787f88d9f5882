use serde::{Deserialize, Serialize};

use crate::storage::ids::TermId;

/// Taxonomy term payload. Terms are unique per (taxonomy, slug).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTerm {
    pub taxonomy: String,
    pub label: String,
    pub slug: String,
}

impl NewTerm {
    pub fn new(taxonomy: impl Into<String>, label: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            label: label.into(),
            slug: slug.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredTerm {
    pub id: TermId,
    pub term: NewTerm,
    pub created_at: i64,
}

/// Result of `TermStore::create_or_get_term`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermUpsert {
    pub id: TermId,
    /// False when a term with the same slug already existed
    pub created: bool,
}
