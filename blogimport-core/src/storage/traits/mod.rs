//! Storage trait definitions
//!
//! All storage traits are defined here, with implementations in `implementations/`.

mod asset;
mod entry;
mod term;

pub use asset::AssetStore;
pub use entry::EntryStore;
pub use term::TermStore;

/// Everything the importer needs from a target store.
///
/// Blanket-implemented for any type that implements the three store traits.
pub trait ContentStore: EntryStore + TermStore + AssetStore + Send + Sync + 'static {}

impl<T> ContentStore for T where T: EntryStore + TermStore + AssetStore + Send + Sync + 'static {}
