//! Persisted dialog state shapes
//!
//! These are the only structures the engine writes through the conversation
//! store. The serialized form matches the hosting contract: a `dialogStack`
//! array of frames plus an engine-private `_lastAccess` timestamp used for
//! session expiry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One persisted stack frame
///
/// `id` names the dialog that owns the frame; `state` is a frame-scoped map
/// exclusively owned and mutated by that dialog. No other dialog reads or
/// writes another dialog's frame state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogInstance {
    /// Id of the dialog that pushed this frame
    pub id: String,
    /// Frame-scoped state, opaque to everything but the owning dialog
    #[serde(default)]
    pub state: HashMap<String, Value>,
}

impl DialogInstance {
    /// Create a fresh frame with empty state
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: HashMap::new(),
        }
    }
}

/// The full persisted unit for one conversation
///
/// Top of stack is the most recently begun, not-yet-completed dialog; an
/// empty stack means no active dialog. Created on the first turn, mutated on
/// every turn an active dialog runs, and cleared only by explicit
/// cancellation or session expiry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedConversation {
    /// The dialog stack, bottom first
    #[serde(rename = "dialogStack", default)]
    pub dialog_stack: Vec<DialogInstance>,

    /// Last time this conversation was accessed, for expiry checks
    #[serde(rename = "_lastAccess", skip_serializing_if = "Option::is_none")]
    pub last_access: Option<DateTime<Utc>>,
}

impl PersistedConversation {
    /// True when no dialog is active
    pub fn is_idle(&self) -> bool {
        self.dialog_stack.is_empty()
    }
}
