//! Execution cursor over a persisted dialog stack
//!
//! A [`DialogContext`] binds together the dialog registry, the persisted
//! stack for one conversation, and the current turn context, and implements
//! the begin/continue/end/replace/cancel semantics dialogs compose with.
//!
//! State machine per conversation: Idle (empty stack) becomes Active on
//! `begin_dialog`; Active stays Active while `continue_dialog` returns
//! waiting; Active returns to Idle when the last frame is popped by
//! `end_dialog` or `cancel_all_dialogs`. Continuing while Idle is a
//! well-defined no-op success, not an error.

use serde_json::Value;
use tracing::debug;

use crate::dialog::{DialogEvent, DialogReason, DialogTurnResult};
use crate::dialog_set::DialogSet;
use crate::error::{DialogError, DialogResult};
use crate::state::DialogInstance;
use crate::turn::TurnContext;

/// Hard bound on dialog stack depth, protecting against runaway nesting
/// on malformed dialog trees.
pub const MAX_STACK_DEPTH: usize = 64;

/// The execution cursor for one conversation's dialog stack
pub struct DialogContext<'a> {
    dialogs: &'a DialogSet,
    turn: &'a mut TurnContext,
    stack: &'a mut Vec<DialogInstance>,
}

impl<'a> DialogContext<'a> {
    /// Bind a context to a registry, turn, and persisted stack
    pub fn new(
        dialogs: &'a DialogSet,
        turn: &'a mut TurnContext,
        stack: &'a mut Vec<DialogInstance>,
    ) -> Self {
        Self {
            dialogs,
            turn,
            stack,
        }
    }

    /// The registry this context resolves dialog ids against
    pub fn dialogs(&self) -> &DialogSet {
        self.dialogs
    }

    /// The current turn context
    pub fn context(&mut self) -> &mut TurnContext {
        self.turn
    }

    /// Read-only view of the stack, bottom first
    pub fn stack(&self) -> &[DialogInstance] {
        self.stack
    }

    /// The top-of-stack frame, if any dialog is active
    pub fn active_dialog(&self) -> Option<&DialogInstance> {
        self.stack.last()
    }

    /// Mutable access to the top-of-stack frame
    pub fn active_dialog_mut(&mut self) -> Option<&mut DialogInstance> {
        self.stack.last_mut()
    }

    /// Push a new frame for `id` and invoke the dialog's start behavior
    pub async fn begin_dialog(
        &mut self,
        id: &str,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        let dialog = self.dialogs.find(id)?;
        if self.stack.len() >= MAX_STACK_DEPTH {
            return Err(DialogError::DepthExceeded(MAX_STACK_DEPTH));
        }
        debug!(dialog_id = id, depth = self.stack.len(), "begin dialog");
        self.stack.push(DialogInstance::new(id));
        dialog.begin_dialog(self, options).await
    }

    /// Resume the top-of-stack dialog with the current turn's input
    ///
    /// An empty stack is a normal outcome: there is nothing to continue, so
    /// this returns `Complete` with no result.
    pub async fn continue_dialog(&mut self) -> DialogResult<DialogTurnResult> {
        let id = match self.stack.last() {
            None => return Ok(DialogTurnResult::complete(None)),
            Some(frame) => frame.id.clone(),
        };
        let dialog = self.dialogs.find(&id)?;
        debug!(dialog_id = %id, "continue dialog");
        dialog.continue_dialog(self).await
    }

    /// Pop the active frame and resume the parent with `result`
    ///
    /// This is the call-return protocol between nested dialogs: the child's
    /// output becomes the argument to the parent's continuation. With no
    /// parent left, the whole stack completes with `result`.
    pub async fn end_dialog(&mut self, result: Option<Value>) -> DialogResult<DialogTurnResult> {
        self.end_active_dialog(DialogReason::EndCalled).await?;
        let parent_id = match self.stack.last() {
            None => return Ok(DialogTurnResult::complete(result)),
            Some(frame) => frame.id.clone(),
        };
        let parent = self.dialogs.find(&parent_id)?;
        debug!(dialog_id = %parent_id, "resume parent dialog");
        parent
            .resume_dialog(self, DialogReason::EndCalled, result)
            .await
    }

    /// Pop the active frame and begin `id` in its place
    ///
    /// Frames below the replaced one are untouched; this hands control off
    /// without growing the stack.
    pub async fn replace_dialog(
        &mut self,
        id: &str,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        self.end_active_dialog(DialogReason::ReplaceCalled).await?;
        self.begin_dialog(id, options).await
    }

    /// Empty the stack from the top down
    ///
    /// Each popped dialog gets its cleanup hook with a cancel reason.
    /// Idempotent on an already-empty stack, in which case nothing was
    /// cancelled and the result is `Complete`.
    pub async fn cancel_all_dialogs(&mut self) -> DialogResult<DialogTurnResult> {
        if self.stack.is_empty() {
            return Ok(DialogTurnResult::complete(None));
        }
        while !self.stack.is_empty() {
            self.end_active_dialog(DialogReason::CancelCalled).await?;
        }
        debug!("cancelled all dialogs");
        Ok(DialogTurnResult::cancelled())
    }

    /// Offer a dialog-level event to the active dialog
    ///
    /// Returns `true` when some dialog in the active tree handled it.
    /// Containers forward the event inward first, so the innermost active
    /// dialog gets first refusal and unhandled events fall back out to the
    /// caller, realizing outward bubbling through call-return.
    pub async fn emit_event(&mut self, event: &DialogEvent) -> DialogResult<bool> {
        let id = match self.stack.last() {
            None => return Ok(false),
            Some(frame) => frame.id.clone(),
        };
        let dialog = self.dialogs.find(&id)?;
        dialog.on_dialog_event(self, event).await
    }

    /// Pop the active frame, running the owning dialog's cleanup hook
    async fn end_active_dialog(&mut self, reason: DialogReason) -> DialogResult<()> {
        if let Some(mut frame) = self.stack.pop() {
            debug!(dialog_id = %frame.id, ?reason, "end dialog");
            // A frame whose dialog is no longer registered is dropped
            // without cleanup rather than failing the whole stack.
            if let Ok(dialog) = self.dialogs.find(&frame.id) {
                dialog.end_dialog(&mut *self.turn, &mut frame, reason).await?;
            }
        }
        Ok(())
    }
}
