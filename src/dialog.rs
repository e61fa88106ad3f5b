//! The polymorphic unit of conversation logic
//!
//! A dialog is a reusable piece of multi-turn interaction. Rather than a
//! class hierarchy, the crate models dialogs as a single capability trait:
//! leaf dialogs (prompts) override `begin`/`continue`, waterfalls drive an
//! ordered step list, and containers additionally expose a nested
//! [`DialogSet`] through [`Dialog::dialogs`].

use async_trait::async_trait;
use serde_json::Value;

use crate::dialog_context::DialogContext;
use crate::dialog_set::DialogSet;
use crate::error::DialogResult;
use crate::state::DialogInstance;
use crate::turn::TurnContext;

/// Why a dialog method is being invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogReason {
    /// A dialog was begun via `begin_dialog`
    BeginCalled,
    /// A dialog was continued with new inbound input
    ContinueCalled,
    /// A dialog ended normally and its parent is resuming
    EndCalled,
    /// A dialog was replaced on the stack
    ReplaceCalled,
    /// The stack is being cancelled
    CancelCalled,
    /// A waterfall step chained directly into the next step
    NextCalled,
}

/// Status portion of a dialog invocation's return contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTurnStatus {
    /// The active dialog is waiting for more input
    Waiting,
    /// The dialog (or the whole stack) completed
    Complete,
    /// The stack was cancelled
    Cancelled,
}

/// The return contract of every dialog invocation
///
/// Not persisted; this is the return channel from the active dialog back to
/// its caller. `result` is meaningful only when `status` is `Complete`.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogTurnResult {
    /// Outcome of the invocation
    pub status: DialogTurnStatus,
    /// Result value produced by a completed dialog
    pub result: Option<Value>,
}

impl DialogTurnResult {
    /// The active dialog is waiting for the next inbound turn
    pub fn waiting() -> Self {
        Self {
            status: DialogTurnStatus::Waiting,
            result: None,
        }
    }

    /// A dialog completed, optionally with a result
    pub fn complete(result: Option<Value>) -> Self {
        Self {
            status: DialogTurnStatus::Complete,
            result,
        }
    }

    /// The stack was cancelled
    pub fn cancelled() -> Self {
        Self {
            status: DialogTurnStatus::Cancelled,
            result: None,
        }
    }
}

/// A dialog-level event, bubbled from the innermost active dialog outward
#[derive(Debug, Clone, PartialEq)]
pub struct DialogEvent {
    /// Event name, usually one of [`dialog_events`]
    pub name: String,
    /// Optional payload
    pub value: Option<Value>,
}

impl DialogEvent {
    /// Create a named event with an optional payload
    pub fn new(name: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Well-known dialog lifecycle event names
pub mod dialog_events {
    /// An activity was received while a dialog tree is active
    pub const ACTIVITY_RECEIVED: &str = "activityReceived";
    /// A request to cancel the active dialog tree
    pub const CANCEL_DIALOG: &str = "cancelDialog";
    /// A request for the active dialog to re-send its prompt
    pub const REPROMPT_DIALOG: &str = "repromptDialog";
    /// An error was raised by a dialog
    pub const ERROR: &str = "error";
}

/// The capability interface every dialog implements
///
/// Dialog instances are shared read-only across all conversations using the
/// same dialog tree, so methods take `&self` and all mutable state lives in
/// the frame owned by the current conversation's stack.
#[async_trait]
pub trait Dialog: Send + Sync {
    /// Unique id of this dialog within its registry
    fn id(&self) -> &str;

    /// Called when the dialog is pushed onto the stack
    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult>;

    /// Called when the dialog is top of stack and new input arrived
    ///
    /// The default treats any input as "still waiting"; dialogs that process
    /// inbound turns override this.
    async fn continue_dialog(&self, _dc: &mut DialogContext<'_>) -> DialogResult<DialogTurnResult> {
        Ok(DialogTurnResult::waiting())
    }

    /// Called when a child dialog this dialog began has completed
    ///
    /// `result` is the child's output. The default ends this dialog as well,
    /// forwarding the result up the stack.
    async fn resume_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        _reason: DialogReason,
        result: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        dc.end_dialog(result).await
    }

    /// Cleanup hook, called when this dialog's frame is popped
    ///
    /// `reason` distinguishes a normal end from cancellation or replacement.
    async fn end_dialog(
        &self,
        _turn: &mut TurnContext,
        _instance: &mut DialogInstance,
        _reason: DialogReason,
    ) -> DialogResult<()> {
        Ok(())
    }

    /// Offered a dialog-level event; return `true` if handled
    ///
    /// Containers forward events to their inner dialog tree first, so an
    /// unhandled event propagates outward until some enclosing scope handles
    /// it or the root is reached.
    async fn on_dialog_event(
        &self,
        _dc: &mut DialogContext<'_>,
        _event: &DialogEvent,
    ) -> DialogResult<bool> {
        Ok(false)
    }

    /// Container capability check
    ///
    /// A container dialog owns a nested registry of child dialogs and returns
    /// it here; leaf dialogs return `None`.
    fn dialogs(&self) -> Option<&DialogSet> {
        None
    }
}
