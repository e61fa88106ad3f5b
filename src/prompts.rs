//! Leaf prompt dialogs
//!
//! Prompts are the simplest resolvable dialogs: begin sends a question and
//! waits, continue interprets the reply and either ends with a resolved
//! value or re-prompts. [`ChoicePrompt`] resolves replies through the choice
//! recognizer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::choices::{recognize_choices, Choice, RecognizeChoicesOptions};
use crate::dialog::{Dialog, DialogTurnResult};
use crate::dialog_context::DialogContext;
use crate::error::{DialogError, DialogResult};

const OPTIONS: &str = "options";

/// Options a prompt dialog is begun with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptOptions {
    /// Initial prompt to send
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Prompt to send when the reply could not be interpreted; falls back to
    /// the initial prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_prompt: Option<String>,
    /// Choices offered by a choice prompt
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

fn store_options(dc: &mut DialogContext<'_>, options: &PromptOptions) -> DialogResult<()> {
    let frame = dc.active_dialog_mut().ok_or(DialogError::NoActiveDialog)?;
    frame
        .state
        .insert(OPTIONS.to_string(), serde_json::to_value(options)?);
    Ok(())
}

fn load_options(dc: &DialogContext<'_>) -> DialogResult<PromptOptions> {
    let frame = dc.active_dialog().ok_or(DialogError::NoActiveDialog)?;
    match frame.state.get(OPTIONS) {
        Some(value) => Ok(serde_json::from_value(value.clone())?),
        None => Ok(PromptOptions::default()),
    }
}

fn parse_options(options: Option<Value>) -> DialogResult<PromptOptions> {
    match options {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(PromptOptions::default()),
    }
}

/// Prompts for free text and resolves to the raw utterance
pub struct TextPrompt {
    id: String,
}

impl TextPrompt {
    /// Create a text prompt with the given dialog id
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Dialog for TextPrompt {
    fn id(&self) -> &str {
        &self.id
    }

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        let options = parse_options(options)?;
        store_options(dc, &options)?;
        if let Some(prompt) = &options.prompt {
            dc.context().send_text(prompt.clone());
        }
        Ok(DialogTurnResult::waiting())
    }

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> DialogResult<DialogTurnResult> {
        let text = dc.context().activity().text.trim().to_string();
        if text.is_empty() {
            let options = load_options(dc)?;
            if let Some(retry) = options.retry_prompt.or(options.prompt) {
                dc.context().send_text(retry);
            }
            return Ok(DialogTurnResult::waiting());
        }
        dc.end_dialog(Some(Value::String(text))).await
    }
}

/// Prompts with a closed choice list and resolves to a [`FoundChoice`]
///
/// [`FoundChoice`]: crate::choices::FoundChoice
pub struct ChoicePrompt {
    id: String,
    recognizer_options: RecognizeChoicesOptions,
}

impl ChoicePrompt {
    /// Create a choice prompt with the given dialog id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            recognizer_options: RecognizeChoicesOptions::default(),
        }
    }

    /// Override how replies are recognized
    pub fn with_recognizer_options(mut self, options: RecognizeChoicesOptions) -> Self {
        self.recognizer_options = options;
        self
    }

    /// Render a prompt with an inline numbered choice list
    fn render(prompt: Option<&str>, choices: &[Choice]) -> String {
        let list = choices
            .iter()
            .enumerate()
            .map(|(i, choice)| {
                let title = choice
                    .action
                    .as_ref()
                    .map(|action| action.title.as_str())
                    .unwrap_or(&choice.value);
                format!("({}) {}", i + 1, title)
            })
            .collect::<Vec<_>>()
            .join(", ");
        match prompt {
            Some(prompt) if !list.is_empty() => format!("{prompt} {list}"),
            Some(prompt) => prompt.to_string(),
            None => list,
        }
    }
}

#[async_trait]
impl Dialog for ChoicePrompt {
    fn id(&self) -> &str {
        &self.id
    }

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        options: Option<Value>,
    ) -> DialogResult<DialogTurnResult> {
        let options = parse_options(options)?;
        store_options(dc, &options)?;
        let rendered = Self::render(options.prompt.as_deref(), &options.choices);
        if !rendered.is_empty() {
            dc.context().send_text(rendered);
        }
        Ok(DialogTurnResult::waiting())
    }

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> DialogResult<DialogTurnResult> {
        let options = load_options(dc)?;
        let utterance = dc.context().activity().text.clone();
        let results = recognize_choices(&utterance, &options.choices, &self.recognizer_options);
        match results.into_iter().next() {
            Some(found) => {
                let resolved = serde_json::to_value(found.resolution)?;
                dc.end_dialog(Some(resolved)).await
            }
            None => {
                let retry = options
                    .retry_prompt
                    .clone()
                    .unwrap_or_else(|| Self::render(options.prompt.as_deref(), &options.choices));
                dc.context().send_text(retry);
                Ok(DialogTurnResult::waiting())
            }
        }
    }
}
