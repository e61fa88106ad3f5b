//! Choice descriptions offered to a user

use serde::{Deserialize, Serialize};

/// Display metadata for a choice
///
/// When present, the `title` is what gets rendered to the user and is also
/// searched during recognition unless suppressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceAction {
    /// Text rendered for this choice
    pub title: String,
}

/// One choice in a closed set offered to the user
///
/// `value` is what recognition returns; `synonyms` are alternate strings
/// that resolve to the same logical choice. Immutable input to the
/// recognizer; the engine itself never persists choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Canonical value returned on a match
    pub value: String,
    /// Alternate forms that resolve to this choice
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    /// Optional display metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ChoiceAction>,
}

impl Choice {
    /// A plain choice with no synonyms or action
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            synonyms: Vec::new(),
            action: None,
        }
    }

    /// Attach synonyms
    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        Choice::new(value)
    }
}

impl From<String> for Choice {
    fn from(value: String) -> Self {
        Choice::new(value)
    }
}
