//! Choice and value recognition
//!
//! Pure functions that score a free-text utterance against a closed set of
//! offered choices, by literal value, synonym, or positional reference. No
//! persisted state and no side effects; safe to call from any component.

mod choice;
mod find_choices;
mod find_values;
mod model_result;
mod recognize_choices;
mod tokenizer;

pub use choice::{Choice, ChoiceAction};
pub use find_choices::{find_choices, FindChoicesOptions};
pub use find_values::{find_values, FindValuesOptions, SortedValue};
pub use model_result::{FoundChoice, FoundValue, ModelResult};
pub use recognize_choices::{recognize_choices, RecognizeChoicesOptions};
pub use tokenizer::{default_tokenizer, Token, TokenizerFn};
