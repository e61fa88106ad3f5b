//! In-memory registry of dialogs for one conversation tree
//!
//! A set belongs to exactly one dialog context or container. After setup it
//! is shared read-only across every conversation using the same tree, which
//! is why entries are `Arc<dyn Dialog>`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dialog::Dialog;
use crate::error::{DialogError, DialogResult};

/// Map from dialog id to dialog instance
#[derive(Default)]
pub struct DialogSet {
    dialogs: HashMap<String, Arc<dyn Dialog>>,
}

impl DialogSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dialog under its id
    ///
    /// Registering the same instance twice is a no-op and returns
    /// `Ok(false)`; registering a *different* instance under an existing id
    /// fails with [`DialogError::DuplicateId`]. The no-op path is what makes
    /// recursive container registration idempotent when a tree is built once
    /// and reused across conversations.
    pub fn add(&mut self, dialog: Arc<dyn Dialog>) -> DialogResult<bool> {
        let id = dialog.id().to_string();
        match self.dialogs.get(&id) {
            Some(existing) if Arc::ptr_eq(existing, &dialog) => Ok(false),
            Some(_) => Err(DialogError::DuplicateId(id)),
            None => {
                self.dialogs.insert(id, dialog);
                Ok(true)
            }
        }
    }

    /// Look up a dialog by id
    pub fn find(&self, id: &str) -> DialogResult<Arc<dyn Dialog>> {
        self.dialogs
            .get(id)
            .cloned()
            .ok_or_else(|| DialogError::DialogNotFound(id.to_string()))
    }

    /// Whether a dialog with the given id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.dialogs.contains_key(id)
    }

    /// Iterate all registered dialogs, in no particular order
    pub fn list(&self) -> impl Iterator<Item = &Arc<dyn Dialog>> {
        self.dialogs.values()
    }

    /// Number of registered dialogs
    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    /// True when no dialogs are registered
    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }
}

impl std::fmt::Debug for DialogSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogSet")
            .field("ids", &self.dialogs.keys().collect::<Vec<_>>())
            .finish()
    }
}
