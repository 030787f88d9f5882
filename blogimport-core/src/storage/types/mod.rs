//! Record types passed to and returned from the store traits

pub mod asset;
pub mod entry;
pub mod term;

pub use asset::{NewAsset, StoredAsset};
pub use entry::{EXTERNAL_ID_KEY, EntryStatus, NewEntry, StoredEntry};
pub use term::{NewTerm, StoredTerm, TermUpsert};
