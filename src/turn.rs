//! Turn-scoped context shared between the engine and dialogs
//!
//! A turn is one inbound-message/outbound-response cycle. The engine performs
//! no I/O of its own: inbound text arrives on the [`TurnContext`], outbound
//! messages are queued on it, and the host drains the queue after the turn.

use serde_json::Value;
use std::collections::HashMap;

/// A minimal inbound or outbound message
///
/// The full wire activity schema is owned by the hosting layer; the engine
/// only needs the text and an optional locale for tokenization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activity {
    /// Message text
    pub text: String,
    /// Locale of the text, when known
    pub locale: Option<String>,
}

impl Activity {
    /// Create a message activity from text
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: None,
        }
    }
}

/// Context for a single turn of conversation
///
/// Carries the inbound activity, collects outbound responses, and exposes a
/// per-turn scratch map dialogs may use for turn-local coordination. The
/// scratch map is never persisted across turns.
#[derive(Debug, Default)]
pub struct TurnContext {
    activity: Activity,
    responses: Vec<Activity>,
    turn_state: HashMap<String, Value>,
}

impl TurnContext {
    /// Create a turn context for an inbound activity
    pub fn new(activity: Activity) -> Self {
        Self {
            activity,
            responses: Vec::new(),
            turn_state: HashMap::new(),
        }
    }

    /// Create a turn context for a plain inbound text message
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(Activity::message(text))
    }

    /// The inbound activity for this turn
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Queue an outbound activity
    pub fn send_activity(&mut self, activity: Activity) {
        self.responses.push(activity);
    }

    /// Queue an outbound text message
    pub fn send_text(&mut self, text: impl Into<String>) {
        self.responses.push(Activity::message(text));
    }

    /// Outbound activities queued so far this turn
    pub fn responses(&self) -> &[Activity] {
        &self.responses
    }

    /// Read-only view of the per-turn scratch map
    pub fn turn_state(&self) -> &HashMap<String, Value> {
        &self.turn_state
    }

    /// Mutable view of the per-turn scratch map
    pub fn turn_state_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.turn_state
    }
}
