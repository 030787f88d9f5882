//! Extension points of the import run
//!
//! Hooks are called synchronously, in registration order, at fixed points of
//! each post's import:
//!
//! 1. `filter_entry` - before the entry is created; may change the payload
//! 2. `entry_metadata` - right after creation; returned pairs are stored
//!    ahead of the external-id back-reference
//! 3. `post_imported` - after the whole per-post pipeline succeeded

use remote::RemotePost;
use std::sync::Arc;

use crate::storage::{EntryId, NewEntry};

pub trait ImportHooks: Send + Sync {
    fn filter_entry(&self, entry: NewEntry, _post: &RemotePost) -> NewEntry {
        entry
    }

    fn entry_metadata(&self, _entry_id: &EntryId, _post: &RemotePost) -> Vec<(String, String)> {
        Vec::new()
    }

    fn post_imported(&self, _entry_id: &EntryId, _post: &RemotePost) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl ImportHooks for NoopHooks {}

/// Several hooks behaving as one
#[derive(Default, Clone)]
pub struct HookSet {
    hooks: Vec<Arc<dyn ImportHooks>>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hook: Arc<dyn ImportHooks>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn push(&mut self, hook: Arc<dyn ImportHooks>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl ImportHooks for HookSet {
    fn filter_entry(&self, entry: NewEntry, post: &RemotePost) -> NewEntry {
        self.hooks
            .iter()
            .fold(entry, |entry, hook| hook.filter_entry(entry, post))
    }

    fn entry_metadata(&self, entry_id: &EntryId, post: &RemotePost) -> Vec<(String, String)> {
        self.hooks
            .iter()
            .flat_map(|hook| hook.entry_metadata(entry_id, post))
            .collect()
    }

    fn post_imported(&self, entry_id: &EntryId, post: &RemotePost) {
        for hook in &self.hooks {
            hook.post_imported(entry_id, post);
        }
    }
}
