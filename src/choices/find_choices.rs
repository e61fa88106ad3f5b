//! Mid-level search for choices within an utterance
//!
//! Layered above [`find_values`]: expands each choice into the set of
//! synonym strings to search for, delegates the search, and maps results
//! back to their owning choice.

use super::choice::Choice;
use super::find_values::{find_values, FindValuesOptions, SortedValue};
use super::model_result::{FoundChoice, ModelResult};

/// Options tweaking the choice search
#[derive(Debug, Clone, Default)]
pub struct FindChoicesOptions {
    /// Value-search options passed straight through
    pub find_values: FindValuesOptions,
    /// When true, the choices' `value` field is not searched over
    pub no_value: bool,
    /// When true, the choices' `action.title` field is not searched over
    pub no_action: bool,
}

/// Find all choices matched lexically within an utterance
///
/// Each choice contributes its value, action title and explicit synonyms to
/// the search (subject to the `no_value`/`no_action` suppression flags), all
/// tagged with the choice's index so a hit on any form resolves to the same
/// logical choice.
pub fn find_choices(
    utterance: &str,
    choices: &[Choice],
    options: &FindChoicesOptions,
) -> Vec<ModelResult<FoundChoice>> {
    let mut synonyms: Vec<SortedValue> = Vec::new();
    for (index, choice) in choices.iter().enumerate() {
        if !options.no_value {
            synonyms.push(SortedValue::new(choice.value.clone(), index));
        }
        if let Some(action) = &choice.action {
            if !options.no_action {
                synonyms.push(SortedValue::new(action.title.clone(), index));
            }
        }
        for synonym in &choice.synonyms {
            synonyms.push(SortedValue::new(synonym.clone(), index));
        }
    }

    find_values(utterance, &synonyms, &options.find_values)
        .into_iter()
        .map(|found| {
            let choice = &choices[found.resolution.index];
            ModelResult {
                start: found.start,
                end: found.end,
                text: found.text,
                type_name: "choice".to_string(),
                resolution: FoundChoice {
                    value: choice.value.clone(),
                    index: found.resolution.index,
                    score: found.resolution.score,
                    synonym: Some(found.resolution.value),
                },
            }
        })
        .collect()
}
