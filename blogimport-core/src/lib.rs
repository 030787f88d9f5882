//! Import pipeline for hosted blog content
//!
//! This crate provides:
//! - **Rich text**: [`RichTextConverter`] turns the block/entity JSON document into HTML
//! - **Assets**: [`AssetImporter`] downloads images once, keyed by a derived filename
//! - **Rewriting**: [`rewrite_images`] swaps remote `<img>` sources for local asset URLs
//! - **Storage**: `EntryStore`, `TermStore`, `AssetStore` traits with memory and SQLite backends
//! - **Orchestration**: [`Importer`] drives categories → posts → per-post linking
//!
//! # Example
//!
//! ```ignore
//! use blogimport_core::{AssetImporter, Importer, MemoryStore, RichTextConverter, UploadDir};
//!
//! let store = Arc::new(MemoryStore::new());
//! let assets = AssetImporter::new(store.clone(), uploads, Arc::new(remote::Client::new()));
//! let importer = Importer::new(source, store, assets, RichTextConverter::new(media_base));
//! let report = importer.import(&PostsQuery::default()).await?;
//! ```

pub mod assets;
pub mod error;
pub mod hooks;
pub mod importer;
pub mod mock;
pub mod report;
pub mod rewrite;
pub mod richtext;
pub mod storage;

pub use assets::{AssetImporter, Downloader, ImportedAsset, derive_filename};
pub use error::{AssetError, ConversionError, DownloadError, ImportError, StoreError};
pub use hooks::{HookSet, ImportHooks, NoopHooks};
pub use importer::{CATEGORY_TAXONOMY, ImportOptions, Importer};
pub use report::{
    CategoryStats, ImportReport, Phase, PostOutcome, PostStage, PostStatus, RunState, SkipReason,
};
pub use rewrite::{FailedImage, RewriteOutcome, rewrite_images};
pub use richtext::{RichTextConverter, RichTextDocument};
pub use storage::{
    AssetId, AssetStore, ContentStore, EXTERNAL_ID_KEY, EntryId, EntryStatus, EntryStore,
    MemoryStore, NewAsset, NewEntry, NewTerm, StoredAsset, StoredEntry, StoredTerm, TermId,
    TermStore, TermUpsert, UploadDir,
};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStore;
