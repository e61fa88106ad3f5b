//! Located, scored recognition results

use serde::{Deserialize, Serialize};

/// A located, scored match within an utterance
///
/// `start` and `end` are char positions into the utterance, end-inclusive,
/// and `text` is the literal span they cover. Recognizer outputs are never
/// persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResult<T> {
    /// Char position where the match starts
    pub start: usize,
    /// Char position of the last matched char
    pub end: usize,
    /// Literal matched text
    pub text: String,
    /// Result kind, `"value"` or `"choice"`
    #[serde(rename = "typeName")]
    pub type_name: String,
    /// The resolved match
    pub resolution: T,
}

/// Resolution payload produced by `find_values`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundValue {
    /// The candidate value that matched
    pub value: String,
    /// Index tag the caller attached to the candidate
    pub index: usize,
    /// Match confidence, 1.0 for an exact full match
    pub score: f64,
}

/// Resolution payload produced by `find_choices` and `recognize_choices`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundChoice {
    /// Canonical value of the matched choice
    pub value: String,
    /// Position of the choice in the caller's list
    pub index: usize,
    /// Match confidence, 1.0 for an exact full match
    pub score: f64,
    /// The specific synonym string that matched, when one did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonym: Option<String>,
}
