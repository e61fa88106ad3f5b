//! Container dialogs that own a nested dialog tree
//!
//! A [`ComponentDialog`] packages a whole child dialog tree behind a single
//! dialog id. The child tree runs on its own persisted stack, stored inside
//! the component's frame, so to the outer stack the component looks like one
//! leaf frame while internally it can nest arbitrarily. When the inner stack
//! empties, the component ends on the outer stack with the inner result,
//! which is how values flow out of nested trees.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::dialog::{Dialog, DialogEvent, DialogReason, DialogTurnResult, DialogTurnStatus};
use crate::dialog_context::DialogContext;
use crate::dialog_set::DialogSet;
use crate::error::{DialogError, DialogResult};
use crate::state::DialogInstance;
use crate::turn::TurnContext;

const PERSISTED_DIALOG_STATE: &str = "dialogState";

/// A dialog that delegates to a nested dialog tree
pub struct ComponentDialog {
    id: String,
    dialogs: DialogSet,
    initial_dialog_id: String,
}

impl ComponentDialog {
    /// Create an empty component with the given id
    ///
    /// The first dialog added becomes the initial dialog unless
    /// [`ComponentDialog::initial_dialog`] overrides it.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dialogs: DialogSet::new(),
            initial_dialog_id: String::new(),
        }
    }

    /// Register a child dialog
    pub fn add_dialog(mut self, dialog: Arc<dyn Dialog>) -> DialogResult<Self> {
        if self.initial_dialog_id.is_empty() {
            self.initial_dialog_id = dialog.id().to_string();
        }
        self.dialogs.add(dialog)?;
        Ok(self)
    }

    /// Override which child dialog begins when the component begins
    pub fn initial_dialog(mut self, id: impl Into<String>) -> Self {
        self.initial_dialog_id = id.into();
        self
    }

    /// Id of the child dialog the component starts with
    pub fn initial_dialog_id(&self) -> &str {
        &self.initial_dialog_id
    }

    /// Deserialize the nested stack out of the component's frame
    fn load_inner_stack(dc: &DialogContext<'_>) -> DialogResult<Vec<DialogInstance>> {
        let frame = dc.active_dialog().ok_or(DialogError::NoActiveDialog)?;
        match frame.state.get(PERSISTED_DIALOG_STATE) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(Vec::new()),
        }
    }

    /// Serialize the nested stack back into the component's frame
    fn save_inner_stack(
        dc: &mut DialogContext<'_>,
        stack: &Vec<DialogInstance>,
    ) -> DialogResult<()> {
        let frame = dc.active_dialog_mut().ok_or(DialogError::NoActiveDialog)?;
        frame
            .state
            .insert(PERSISTED_DIALOG_STATE.to_string(), serde_json::to_value(stack)?);
        Ok(())
    }

    /// Map an inner turn result onto the outer stack
    ///
    /// An inner completion ends the component itself, handing the inner
    /// result to the outer parent; anything else passes through unchanged.
    async fn finish_turn(
        &self,
        dc: &mut DialogContext<'_>,
        inner_result: DialogTurnResult,
    ) -> DialogResult<DialogTurnResult> {
        if inner_result.status == DialogTurnStatus::Complete {
            debug!(dialog_id = %self.id, "component inner stack completed");
            dc.end_dialog(inner_result.result).await
        } else {
            Ok(inner_result)
        }
    }
}

#[async_trait]
impl Dialog for ComponentDialog {
    fn id(&self) -> &str {
        &self.id
    }

    fn dialogs(&self) -> Option<&DialogSet> {
        Some(&self.dialogs)
    }

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        let mut inner_stack: Vec<DialogInstance> = Vec::new();
        let inner_result = {
            let mut inner = DialogContext::new(&self.dialogs, dc.context(), &mut inner_stack);
            inner.begin_dialog(&self.initial_dialog_id, options).await?
        };
        Self::save_inner_stack(dc, &inner_stack)?;
        self.finish_turn(dc, inner_result).await
    }

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> DialogResult<DialogTurnResult> {
        let mut inner_stack = Self::load_inner_stack(dc)?;
        let inner_result = {
            let mut inner = DialogContext::new(&self.dialogs, dc.context(), &mut inner_stack);
            inner.continue_dialog().await?
        };
        Self::save_inner_stack(dc, &inner_stack)?;
        self.finish_turn(dc, inner_result).await
    }

    async fn resume_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        reason: DialogReason,
        result: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        // A dialog this component started returned control; hand the result
        // to the inner tree's active dialog. With no inner dialog left the
        // component itself is done.
        let mut inner_stack = Self::load_inner_stack(dc)?;
        let active_id = match inner_stack.last() {
            None => return dc.end_dialog(result).await,
            Some(frame) => frame.id.clone(),
        };
        let active = self.dialogs.find(&active_id)?;
        let inner_result = {
            let mut inner = DialogContext::new(&self.dialogs, dc.context(), &mut inner_stack);
            active.resume_dialog(&mut inner, reason, result).await?
        };
        Self::save_inner_stack(dc, &inner_stack)?;
        self.finish_turn(dc, inner_result).await
    }

    async fn end_dialog(
        &self,
        turn: &mut TurnContext,
        instance: &mut DialogInstance,
        reason: DialogReason,
    ) -> DialogResult<()> {
        // Cancellation must reach the nested tree: give every inner frame
        // its cleanup hook, top of stack first.
        if reason == DialogReason::CancelCalled {
            let mut inner_stack: Vec<DialogInstance> =
                match instance.state.get(PERSISTED_DIALOG_STATE) {
                    Some(value) => serde_json::from_value(value.clone())?,
                    None => Vec::new(),
                };
            while let Some(mut frame) = inner_stack.pop() {
                if let Ok(dialog) = self.dialogs.find(&frame.id) {
                    dialog.end_dialog(turn, &mut frame, reason).await?;
                }
            }
            instance.state.insert(
                PERSISTED_DIALOG_STATE.to_string(),
                serde_json::to_value(&inner_stack)?,
            );
        }
        Ok(())
    }

    async fn on_dialog_event(
        &self,
        dc: &mut DialogContext<'_>,
        event: &DialogEvent,
    ) -> DialogResult<bool> {
        // Offer the event to the inner tree first; reporting `false` back
        // out lets the event keep bubbling to enclosing scopes.
        let mut inner_stack = Self::load_inner_stack(dc)?;
        let handled = {
            let mut inner = DialogContext::new(&self.dialogs, dc.context(), &mut inner_stack);
            inner.emit_event(event).await?
        };
        Self::save_inner_stack(dc, &inner_stack)?;
        Ok(handled)
    }
}
