//! Per-turn driver for the dialog system
//!
//! The [`DialogManager`] owns the dialog registry for one dialog tree and
//! runs one conversation turn end to end: load persisted state, expire stale
//! sessions, continue or begin the root dialog, persist the mutated stack,
//! and hand the turn result back to the host.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::dialog::{Dialog, DialogTurnResult};
use crate::dialog_context::DialogContext;
use crate::dialog_set::DialogSet;
use crate::error::{DialogError, DialogResult};
use crate::state::PersistedConversation;
use crate::storage::ConversationStore;
use crate::turn::TurnContext;

/// Bound on container nesting during recursive registration, protecting
/// against malformed dialog trees.
pub const MAX_REGISTRATION_DEPTH: usize = 32;

/// Result of running one conversation turn
#[derive(Debug, Clone, PartialEq)]
pub struct DialogManagerResult {
    /// Outcome of the dialog execution for this turn
    pub turn_result: DialogTurnResult,
}

/// Runs the dialog system, one turn at a time per conversation
///
/// Requires a root dialog and a conversation store before the first turn;
/// a turn arriving earlier fails fast with an unconfigured error. The
/// registry is assembled at configuration time and shared read-only across
/// conversations afterwards.
#[derive(Default)]
pub struct DialogManager {
    dialogs: DialogSet,
    root_dialog_id: Option<String>,
    store: Option<Arc<dyn ConversationStore>>,
    expire_after: Option<Duration>,
}

impl DialogManager {
    /// Create an unconfigured manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the root dialog
    ///
    /// The root and every container dialog reachable from it are registered
    /// into the manager's registry, recursively and exactly once, so forward
    /// references and shared sub-dialogs resolve regardless of tree shape.
    pub fn with_root(mut self, dialog: Arc<dyn Dialog>) -> DialogResult<Self> {
        self.root_dialog_id = Some(dialog.id().to_string());
        self.dialogs.add(dialog.clone())?;
        register_containers(&mut self.dialogs, &dialog, 0)?;
        Ok(self)
    }

    /// Configure the conversation store
    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Expire conversations idle for at least this long
    ///
    /// An expired conversation has its stack discarded before the turn runs,
    /// so it always starts over from an empty stack. Default is to never
    /// expire.
    pub fn with_expire_after(mut self, expire_after: Duration) -> Self {
        self.expire_after = Some(expire_after);
        self
    }

    /// The manager's dialog registry
    pub fn dialogs(&self) -> &DialogSet {
        &self.dialogs
    }

    /// Run one turn for the conversation identified by `conversation_id`
    ///
    /// Errors raised by dialog steps propagate unmodified, and a turn that
    /// errors mid-step is not persisted.
    pub async fn on_turn(
        &self,
        conversation_id: &str,
        turn: &mut TurnContext,
    ) -> DialogResult<DialogManagerResult> {
        let root_id = self
            .root_dialog_id
            .as_deref()
            .ok_or(DialogError::Unconfigured("root dialog"))?;
        let store = self
            .store
            .as_ref()
            .ok_or(DialogError::Unconfigured("conversation store"))?;

        let loaded = store
            .read(conversation_id)
            .await
            .map_err(DialogError::Storage)?;
        let (mut state, token) = match loaded {
            Some(stored) => (stored.state, Some(stored.token)),
            None => (PersistedConversation::default(), None),
        };

        // Session expiry is a between-turn staleness check: an expired
        // conversation starts the turn from an empty stack.
        let now = Utc::now();
        if let (Some(expire_after), Some(last_access)) = (self.expire_after, state.last_access) {
            if now - last_access >= expire_after {
                info!(conversation_id, "conversation expired, discarding dialog stack");
                state.dialog_stack.clear();
            }
        }
        state.last_access = Some(now);

        let turn_result = {
            let mut dc = DialogContext::new(&self.dialogs, turn, &mut state.dialog_stack);
            if dc.stack().is_empty() {
                debug!(conversation_id, root_id, "beginning root dialog");
                dc.begin_dialog(root_id, None).await?
            } else {
                debug!(conversation_id, "continuing active dialog");
                dc.continue_dialog().await?
            }
        };

        store
            .write(conversation_id, &state, token.as_deref())
            .await
            .map_err(DialogError::Storage)?;

        Ok(DialogManagerResult { turn_result })
    }
}

/// Recursively register every container reachable from `dialog`
///
/// Cycle-safe: a container already present in the registry is skipped, and
/// nesting deeper than [`MAX_REGISTRATION_DEPTH`] is rejected outright.
fn register_containers(
    registry: &mut DialogSet,
    dialog: &Arc<dyn Dialog>,
    depth: usize,
) -> DialogResult<()> {
    let Some(children) = dialog.dialogs() else {
        return Ok(());
    };
    if depth >= MAX_REGISTRATION_DEPTH {
        return Err(DialogError::DepthExceeded(MAX_REGISTRATION_DEPTH));
    }
    for child in children.list() {
        if child.dialogs().is_some() {
            // Ok(false) means this exact instance was seen before; do not
            // recurse into it again or a cyclic tree would never terminate.
            if registry.add(child.clone())? {
                register_containers(registry, child, depth + 1)?;
            }
        }
    }
    Ok(())
}
