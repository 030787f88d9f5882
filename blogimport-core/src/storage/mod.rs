//! Content store abstractions
//!
//! The importer talks to the target store through three traits:
//!
//! - `EntryStore` - content entries, their metadata, terms, tags and primary image
//! - `TermStore` - taxonomy terms and term metadata
//! - `AssetStore` - registered binary assets
//!
//! `ContentStore` bundles all three. Two implementations are available:
//!
//! - `MemoryStore` - in-memory, used by tests and dry runs
//! - `SqliteStore` - SQLite-backed (requires `sqlite` feature)
//!
//! Downloaded files themselves live in an `UploadDir`.

pub mod helper;
pub mod ids;
pub mod implementations;
pub mod traits;
pub mod types;

pub use ids::{AssetId, EntryId, TermId};
pub use implementations::fs::UploadDir;
pub use implementations::memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use implementations::sqlite::SqliteStore;
pub use traits::{AssetStore, ContentStore, EntryStore, TermStore};
pub use types::{
    EXTERNAL_ID_KEY, EntryStatus, NewAsset, NewEntry, NewTerm, StoredAsset, StoredEntry,
    StoredTerm, TermUpsert,
};
