//! Waterfall dialogs: an ordered list of steps with resumable position
//!
//! A waterfall runs one step per invocation and keeps a single integer of
//! frame-local state, the index of the step currently waiting. Steps signal
//! what happens next through [`StepResult`]: chaining into the next step is
//! an explicit loop driven by the returned status, not nested continuations,
//! so chained steps execute synchronously within one turn and the only
//! suspension point is a step that waits.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::dialog::{Dialog, DialogReason, DialogTurnResult};
use crate::dialog_context::DialogContext;
use crate::error::{DialogError, DialogResult};
use crate::prompts::PromptOptions;
use crate::turn::TurnContext;

use async_trait::async_trait;

const STEP_INDEX: &str = "stepIndex";
const OPTIONS: &str = "options";
const VALUES: &str = "values";
const INSTANCE_ID: &str = "instanceId";

/// What a waterfall step wants to happen next
#[derive(Debug)]
pub enum StepResult {
    /// Stay on this step and yield the turn to the user
    Wait,
    /// Advance to the next step within the same turn, carrying a value
    Next(Option<Value>),
    /// A child dialog was begun; propagate its turn result unchanged
    Began(DialogTurnResult),
    /// End the waterfall early with a result
    End(Option<Value>),
}

/// Boxed future returned by a waterfall step
pub type StepFuture<'c> = Pin<Box<dyn Future<Output = DialogResult<StepResult>> + Send + 'c>>;

/// A single waterfall step
///
/// Steps are plain functions so a dialog tree stays cheap to build and share;
/// write them as `fn step(step: &mut WaterfallStepContext<'_, '_>) ->
/// StepFuture<'_>` wrapping an async block.
pub type WaterfallStep =
    for<'a, 'b, 'c> fn(&'c mut WaterfallStepContext<'a, 'b>) -> StepFuture<'c>;

/// Per-step view of the waterfall's execution state
pub struct WaterfallStepContext<'a, 'b> {
    dc: &'b mut DialogContext<'a>,
    index: usize,
    reason: DialogReason,
    result: Option<Value>,
}

impl<'a, 'b> WaterfallStepContext<'a, 'b> {
    /// Zero-based index of the running step
    pub fn index(&self) -> usize {
        self.index
    }

    /// Why this step is running
    pub fn reason(&self) -> DialogReason {
        self.reason
    }

    /// Input carried into this step: the utterance on a continuation, or the
    /// completed child dialog's result
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Take ownership of the carried input
    pub fn take_result(&mut self) -> Option<Value> {
        self.result.take()
    }

    /// Options the waterfall was begun with
    pub fn options(&self) -> Option<Value> {
        self.dc
            .active_dialog()
            .and_then(|frame| frame.state.get(OPTIONS))
            .cloned()
    }

    /// The underlying dialog context, for stack operations
    pub fn dialog_context(&mut self) -> &mut DialogContext<'a> {
        self.dc
    }

    /// The current turn context
    pub fn context(&mut self) -> &mut TurnContext {
        self.dc.context()
    }

    /// Queue an outbound text message
    pub fn send_text(&mut self, text: impl Into<String>) {
        self.dc.context().send_text(text);
    }

    /// Store a named value in the waterfall's cross-step values map
    pub fn set_value(&mut self, name: &str, value: Value) -> DialogResult<()> {
        let frame = self
            .dc
            .active_dialog_mut()
            .ok_or(DialogError::NoActiveDialog)?;
        let values = frame
            .state
            .entry(VALUES.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = values {
            map.insert(name.to_string(), value);
        }
        Ok(())
    }

    /// Read a named value from the cross-step values map
    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.dc
            .active_dialog()
            .and_then(|frame| frame.state.get(VALUES))
            .and_then(|values| values.get(name))
            .cloned()
    }

    /// Begin a child dialog from within this step
    pub async fn begin_dialog(
        &mut self,
        id: &str,
        options: Option<Value>,
    ) -> DialogResult<StepResult> {
        let result = self.dc.begin_dialog(id, options).await?;
        Ok(StepResult::Began(result))
    }

    /// Begin a text prompt with the given prompt message
    pub async fn prompt_text(&mut self, id: &str, prompt: &str) -> DialogResult<StepResult> {
        let options = PromptOptions {
            prompt: Some(prompt.to_string()),
            ..PromptOptions::default()
        };
        self.begin_dialog(id, Some(serde_json::to_value(options)?))
            .await
    }

    /// Begin a choice prompt with the given message and choices
    pub async fn prompt_choices(
        &mut self,
        id: &str,
        prompt: &str,
        choices: Vec<crate::choices::Choice>,
    ) -> DialogResult<StepResult> {
        let options = PromptOptions {
            prompt: Some(prompt.to_string()),
            retry_prompt: None,
            choices,
        };
        self.begin_dialog(id, Some(serde_json::to_value(options)?))
            .await
    }

    /// Advance to the next step, carrying `value` into it
    pub fn next(&self, value: Option<Value>) -> DialogResult<StepResult> {
        Ok(StepResult::Next(value))
    }
}

/// A dialog that executes an ordered list of steps
pub struct WaterfallDialog {
    id: String,
    steps: Vec<WaterfallStep>,
}

impl WaterfallDialog {
    /// Create an empty waterfall with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step; steps run in the order added
    pub fn step(mut self, step: WaterfallStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the waterfall has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn stored_index(&self, dc: &DialogContext<'_>) -> DialogResult<usize> {
        let frame = dc.active_dialog().ok_or(DialogError::NoActiveDialog)?;
        Ok(frame
            .state
            .get(STEP_INDEX)
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize)
    }

    fn store_index(&self, dc: &mut DialogContext<'_>, index: usize) -> DialogResult<()> {
        let frame = dc.active_dialog_mut().ok_or(DialogError::NoActiveDialog)?;
        frame
            .state
            .insert(STEP_INDEX.to_string(), Value::from(index as u64));
        Ok(())
    }

    /// Drive steps from `index`, looping while steps chain with `Next`
    async fn run_steps(
        &self,
        dc: &mut DialogContext<'_>,
        mut index: usize,
        mut reason: DialogReason,
        mut result: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        loop {
            if index >= self.steps.len() {
                // Ran off the end of the list: the waterfall is done.
                return dc.end_dialog(result).await;
            }
            self.store_index(dc, index)?;
            debug!(dialog_id = %self.id, step = index, "run waterfall step");
            let outcome = {
                let mut step_cx = WaterfallStepContext {
                    dc: &mut *dc,
                    index,
                    reason,
                    result: result.take(),
                };
                (self.steps[index])(&mut step_cx).await?
            };
            match outcome {
                StepResult::Wait => return Ok(DialogTurnResult::waiting()),
                StepResult::Next(value) => {
                    index += 1;
                    reason = DialogReason::NextCalled;
                    result = value;
                }
                StepResult::Began(turn_result) => return Ok(turn_result),
                StepResult::End(value) => return dc.end_dialog(value).await,
            }
        }
    }
}

#[async_trait]
impl Dialog for WaterfallDialog {
    fn id(&self) -> &str {
        &self.id
    }

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        {
            let frame = dc.active_dialog_mut().ok_or(DialogError::NoActiveDialog)?;
            let mut state = HashMap::new();
            state.insert(
                INSTANCE_ID.to_string(),
                Value::String(Uuid::new_v4().to_string()),
            );
            state.insert(VALUES.to_string(), Value::Object(Map::new()));
            if let Some(options) = options {
                state.insert(OPTIONS.to_string(), options);
            }
            frame.state = state;
        }
        self.run_steps(dc, 0, DialogReason::BeginCalled, None).await
    }

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> DialogResult<DialogTurnResult> {
        let utterance = dc.context().activity().text.clone();
        let index = self.stored_index(dc)?;
        // The stored index points at the step that waited; the inbound turn
        // resumes at the step after it, carrying the utterance.
        self.run_steps(
            dc,
            index + 1,
            DialogReason::ContinueCalled,
            Some(Value::String(utterance)),
        )
        .await
    }

    async fn resume_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        reason: DialogReason,
        result: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        let index = self.stored_index(dc)?;
        self.run_steps(dc, index + 1, reason, result).await
    }
}
