//! Entry types for storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::ids::{AssetId, EntryId};

/// Metadata key holding the remote system's identifier on entries and terms
pub const EXTERNAL_ID_KEY: &str = "external_id";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Draft,
    #[default]
    Published,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(EntryStatus::Draft),
            "published" => Some(EntryStatus::Published),
            _ => None,
        }
    }
}

/// Entry payload handed to `EntryStore::create_entry`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub entry_type: String,
    pub title: String,
    /// HTML body
    pub content: String,
    pub status: EntryStatus,
    pub slug: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewEntry {
    /// A published blog post
    pub fn post(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            entry_type: "post".to_string(),
            title: title.into(),
            content: content.into(),
            status: EntryStatus::Published,
            slug: None,
            published_at: None,
        }
    }

    pub fn with_slug(mut self, slug: Option<String>) -> Self {
        self.slug = slug;
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }
}

/// A stored entry with its store-assigned fields
#[derive(Clone, Debug, PartialEq)]
pub struct StoredEntry {
    pub id: EntryId,
    pub entry: NewEntry,
    pub primary_image: Option<AssetId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl StoredEntry {
    pub fn title(&self) -> &str {
        &self.entry.title
    }

    pub fn content(&self) -> &str {
        &self.entry.content
    }
}
